//! Type-safe indices for vocabulary and instance symbols.
//!
//! This module provides newtype wrappers that enforce compile-time distinction
//! between predicate, constant, object, atom and instance indices, preventing
//! the common mistake of looking up an atom with an object index.
use std::fmt;

/// A predicate index within a [`Vocabulary`][crate::vocabulary::Vocabulary].
///
/// Indices are assigned in insertion order and are stable for the lifetime
/// of the vocabulary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PredicateId(u32);

impl PredicateId {
    pub const fn new(index: u32) -> Self {
        PredicateId(index)
    }

    /// Returns the raw index as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PredicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A constant index within a [`Vocabulary`][crate::vocabulary::Vocabulary].
///
/// Constants are object names shared by every instance of the vocabulary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ConstantId(u32);

impl ConstantId {
    pub const fn new(index: u32) -> Self {
        ConstantId(index)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// An object index within an [`Instance`][crate::instance::Instance].
///
/// # Invariants
///
/// - Object indices are dense: `0..instance.num_objects()`
/// - Indices are never reused within an instance
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const fn new(index: u32) -> Self {
        ObjectId(index)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

impl From<ObjectId> for usize {
    fn from(object: ObjectId) -> Self {
        object.index()
    }
}

/// An atom index within an [`Instance`][crate::instance::Instance].
///
/// Static and dynamic atoms share one index space.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AtomId(u32);

impl AtomId {
    pub const fn new(index: u32) -> Self {
        AtomId(index)
    }

    pub const fn id(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A caller-assigned instance index.
///
/// The caller must guarantee that distinct instances carry distinct indices,
/// since states are compared by `(instance, atoms)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(u32);

impl InstanceId {
    pub const fn new(index: u32) -> Self {
        InstanceId(index)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

impl From<u32> for InstanceId {
    fn from(index: u32) -> Self {
        InstanceId(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_ordered() {
        let a = ObjectId::new(1);
        let b = ObjectId::new(2);
        assert!(a < b);
        assert_eq!(a.index(), 1);
        assert_eq!(usize::from(b), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(PredicateId::new(3).to_string(), "p3");
        assert_eq!(ConstantId::new(0).to_string(), "k0");
        assert_eq!(ObjectId::new(7).to_string(), "o7");
        assert_eq!(AtomId::new(4).to_string(), "a4");
        assert_eq!(InstanceId::from(2).to_string(), "I2");
    }
}
