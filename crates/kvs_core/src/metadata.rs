//! Database metadata record.

use crate::error::{KvsError, KvsResult};
use serde::{Deserialize, Serialize};

/// Reserved key holding the metadata record.
pub const METADATA_KEY: &[u8] = b".kvs";

/// Current metadata format version.
pub const FORMAT_VERSION: u32 = 1;

/// Versioned descriptor written once by `init`.
///
/// Stored as pretty-printed JSON with a trailing newline:
///
/// ```text
/// {
///   "version": 1
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Format version of the database.
    pub version: u32,
}

impl Metadata {
    /// Returns the metadata written by this version of kvs.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: FORMAT_VERSION,
        }
    }

    /// Encodes the metadata to its stored form.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(&self) -> KvsResult<Vec<u8>> {
        let mut buf = serde_json::to_vec_pretty(self)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Decodes and validates a stored metadata record.
    ///
    /// # Errors
    ///
    /// - [`KvsError::Json`] if the bytes are not a metadata object
    /// - [`KvsError::Metadata`] if the version is not supported
    pub fn decode(data: &[u8]) -> KvsResult<Self> {
        let metadata: Self = serde_json::from_slice(data)?;
        if metadata.version != FORMAT_VERSION {
            return Err(KvsError::metadata(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                metadata.version
            )));
        }
        Ok(metadata)
    }
}
