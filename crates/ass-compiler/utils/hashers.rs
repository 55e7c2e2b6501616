//! Hash function utilities for consistent performance across platforms
//!
//! Provides ahash-based maps used for the script info table, raw style
//! fields and the compiled style table. `DoS` resistance comes from the
//! random seeds of `ahash::RandomState`.

use ahash::RandomState;
use std::collections::HashMap;

/// `HashMap` with the crate's hasher
pub type AssHashMap<K, V> = HashMap<K, V, RandomState>;

/// Create a new `HashMap` with specific capacity and optimized hasher
///
/// Pre-allocates the specified capacity to avoid rehashing during construction.
/// Used when the number of styles is known up front.
#[must_use]
pub fn create_hash_map_with_capacity<K, V>(capacity: usize) -> AssHashMap<K, V> {
    HashMap::with_capacity_and_hasher(capacity, RandomState::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_hash_map_with_capacity_works() {
        let mut map = create_hash_map_with_capacity::<String, i32>(100);
        map.insert("test".to_string(), 42);
        assert_eq!(map.get("test"), Some(&42));
        assert!(map.capacity() >= 100);
    }
}
