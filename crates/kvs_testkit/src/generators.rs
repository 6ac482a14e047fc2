//! Property-based test generators using proptest.
//!
//! Provides strategies for generating keys and values that satisfy the
//! store's limits.

use kvs_core::{MAX_KEY_SIZE, METADATA_KEY};
use proptest::prelude::*;

/// Strategy for generating valid, non-reserved keys of arbitrary bytes.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=64)
        .prop_filter("Key must not be the metadata key", |k| k != METADATA_KEY)
}

/// Strategy for generating keys up to the engine's key limit.
pub fn long_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=MAX_KEY_SIZE)
        .prop_filter("Key must not be the metadata key", |k| k != METADATA_KEY)
}

/// Strategy for generating values of at most `max` bytes.
pub fn value_strategy(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max)
}

/// Strategy for generating printable keys, usable as command-line arguments.
pub fn printable_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,31}")
        .expect("Invalid regex")
        .prop_filter("Key must not be the metadata key", |k| k.as_bytes() != METADATA_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn generated_keys_are_valid() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let key = long_key_strategy().new_tree(&mut runner).unwrap().current();
            assert!(!key.is_empty());
            assert!(key.len() <= MAX_KEY_SIZE);
            assert_ne!(key.as_slice(), METADATA_KEY);
        }
    }

    #[test]
    fn generated_values_respect_limit() {
        let mut runner = TestRunner::default();
        for _ in 0..100 {
            let value = value_strategy(32).new_tree(&mut runner).unwrap().current();
            assert!(value.len() <= 32);
        }
    }
}
