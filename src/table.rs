//! Unique table for hash-consing.
//!
//! Values are stored densely in insertion order and chained into hash buckets.
//! Indices are 1-based (0 marks an empty bucket / end of chain), are never
//! reused, and the table only grows.

use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T> {
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");

        let buckets_size = 1 << bits;
        Self {
            data: Vec::new(),
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }

    /// Get the number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index - 1].value
    }

    /// Get the index of the next value in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index - 1].next
    }

    fn set_next(&mut self, index: usize, next: usize) {
        assert_ne!(index, 0, "Index is 0");
        self.data[index - 1].next = next;
    }

    /// Iterate over `(index, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.data.iter().enumerate().map(|(i, e)| (i + 1, &e.value))
    }
}

impl<T> Table<T>
where
    T: MyHash,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Append a new value and link it at the end of its bucket chain.
    fn push(&mut self, value: T, tail: usize, bucket_index: usize) -> usize {
        self.data.push(Entry { value, next: 0 });
        let i = self.data.len();
        if tail == 0 {
            self.buckets[bucket_index] = i;
        } else {
            self.set_next(tail, i);
        }
        i
    }

    /// Look up a value without inserting it.
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: Eq,
    {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != 0 {
            if value == self.value(index) {
                return Some(index);
            }
            index = self.next(index);
        }
        None
    }

    /// Put a value into the table and return its index.
    ///
    /// If an equal value is already present, its index is returned and
    /// the table is left unchanged.
    pub fn put(&mut self, value: T) -> usize
    where
        T: Eq,
    {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            let i = self.push(value, 0, bucket_index);
            self.maybe_grow();
            return i;
        }

        loop {
            assert!(index > 0);

            if &value == self.value(index) {
                // The value already exists.
                return index;
            }

            let next = self.next(index);

            if next == 0 {
                let i = self.push(value, index, bucket_index);
                self.maybe_grow();
                return i;
            } else {
                index = next;
            }
        }
    }

    /// Double the number of buckets once the load factor exceeds 2.
    fn maybe_grow(&mut self) {
        if self.data.len() <= 2 * self.buckets.len() || self.buckets.len() >= 1 << 31 {
            return;
        }

        let size = self.buckets.len() * 2;
        log::debug!("table: rehashing {} values into {} buckets", self.data.len(), size);
        self.buckets = vec![0; size];
        self.bitmask = (size - 1) as u64;

        let mut tails = vec![0usize; size];
        for i in 1..=self.data.len() {
            self.set_next(i, 0);
            let b = self.bucket_index(self.value(i));
            if tails[b] == 0 {
                self.buckets[b] = i;
            } else {
                self.set_next(tails[b], i);
            }
            tails[b] = i;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    struct Item(i32);

    impl MyHash for Item {
        fn hash(&self) -> u64 {
            self.0.unsigned_abs() as u64
        }
    }

    #[test]
    fn test_put() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(5));
        let index2 = table.put(Item(-5));
        assert_ne!(index1, index2);
        assert_eq!(table[index1], Item(5));
        assert_eq!(table[index2], Item(-5));
        assert_eq!(table.next(index1), index2);
    }

    #[test]
    fn test_put_existing() {
        let mut table = Table::new(2);
        let index1 = table.put(Item(7));
        let index2 = table.put(Item(7));
        assert_eq!(index1, index2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_indices_start_at_one() {
        let mut table = Table::new(2);
        assert_eq!(table.put(Item(1)), 1);
        assert_eq!(table.put(Item(2)), 2);
        assert_eq!(table.find(&Item(2)), Some(2));
        assert_eq!(table.find(&Item(3)), None);
    }

    #[test]
    fn test_grow_keeps_indices() {
        let mut table = Table::new(1);
        let indices: Vec<_> = (0..100).map(|i| table.put(Item(i))).collect();
        assert!(table.num_buckets() > 2);
        for (i, &index) in indices.iter().enumerate() {
            assert_eq!(table[index], Item(i as i32));
            assert_eq!(table.find(&Item(i as i32)), Some(index));
            assert_eq!(table.put(Item(i as i32)), index);
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    #[should_panic(expected = "Index is 0")]
    fn test_index_zero() {
        let table = Table::<Item>::new(2);
        table.value(0);
    }
}
