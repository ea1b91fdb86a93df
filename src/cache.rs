//! Denotation vectors memoized by element index.
//!
//! Entries are never evicted: an interned expression keeps its vector for the
//! lifetime of the evaluator.

use std::collections::HashMap;

/// A [HashMap] from element indices to values that counts hits and misses.
pub struct HashMapCache<V> {
    map: HashMap<u32, V>,
    hits: usize,
    misses: usize,
}

impl<V> HashMapCache<V> {
    /// Creates a new cache with room for `2^bits` entries.
    pub fn new(bits: usize) -> Self {
        Self {
            map: HashMap::with_capacity(1 << bits),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Value of the element at `index`, counting the hit or miss.
    #[inline]
    pub fn get(&mut self, index: u32) -> Option<&V> {
        let value = self.map.get(&index);
        if value.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        value
    }

    /// Same as [`get`](Self::get), without counting.
    ///
    /// Takes `&self`, so parallel evaluation can read through a shared reference.
    #[inline]
    pub fn peek(&self, index: u32) -> Option<&V> {
        self.map.get(&index)
    }

    #[inline]
    pub fn insert(&mut self, index: u32, value: V) {
        self.map.insert(index, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut cache = HashMapCache::new(4);
        assert!(cache.is_empty());

        cache.insert(3, "c_top");
        cache.insert(7, "c_bot");
        assert_eq!(cache.get(3), Some(&"c_top"));
        assert_eq!(cache.get(7), Some(&"c_bot"));
        assert_eq!(cache.get(5), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_peek_does_not_count() {
        let mut cache = HashMapCache::new(2);
        cache.insert(1, String::from("one"));
        assert_eq!(cache.peek(1).map(String::as_str), Some("one"));
        assert_eq!(cache.peek(2), None);
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 0);
    }
}
