//! Denotations: the value of an expression in one state.

use std::fmt;

use crate::bitset::BitSet;
use crate::reference::ElementKind;

/// Distance value for an unreachable target.
pub const INFINITY: u32 = u32::MAX;

/// A set of objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConceptDenotation(BitSet);

impl ConceptDenotation {
    pub fn empty(num_objects: usize) -> Self {
        Self(BitSet::new(num_objects))
    }

    pub fn full(num_objects: usize) -> Self {
        Self(BitSet::full(num_objects))
    }

    pub fn from_bits(bits: BitSet) -> Self {
        Self(bits)
    }

    pub fn num_objects(&self) -> usize {
        self.0.universe()
    }

    pub fn bits(&self) -> &BitSet {
        &self.0
    }

    pub(crate) fn bits_mut(&mut self) -> &mut BitSet {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, object: usize) -> bool {
        self.0.contains(object)
    }

    pub fn insert(&mut self, object: usize) -> bool {
        self.0.insert(object)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter()
    }
}

/// A binary relation over objects, stored as one successor set per object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleDenotation {
    rows: Vec<BitSet>,
}

impl RoleDenotation {
    pub fn empty(num_objects: usize) -> Self {
        Self {
            rows: vec![BitSet::new(num_objects); num_objects],
        }
    }

    pub fn full(num_objects: usize) -> Self {
        Self {
            rows: vec![BitSet::full(num_objects); num_objects],
        }
    }

    pub fn identity(concept: &ConceptDenotation) -> Self {
        let mut role = Self::empty(concept.num_objects());
        for a in concept.iter() {
            role.insert(a, a);
        }
        role
    }

    pub fn num_objects(&self) -> usize {
        self.rows.len()
    }

    /// Number of pairs in the relation.
    pub fn len(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    pub fn insert(&mut self, a: usize, b: usize) -> bool {
        self.rows[a].insert(b)
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.rows[a].contains(b)
    }

    /// The objects related to `a`.
    pub fn successors(&self, a: usize) -> &BitSet {
        &self.rows[a]
    }

    /// Iterate over pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(a, row)| row.iter().map(move |b| (a, b)))
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.rows.iter().zip(&other.rows).all(|(r, s)| r.is_subset(s))
    }

    pub fn union_with(&mut self, other: &Self) {
        for (r, s) in self.rows.iter_mut().zip(&other.rows) {
            r.union_with(s);
        }
    }

    pub fn intersect_with(&mut self, other: &Self) {
        for (r, s) in self.rows.iter_mut().zip(&other.rows) {
            r.intersect_with(s);
        }
    }

    pub fn difference_with(&mut self, other: &Self) {
        for (r, s) in self.rows.iter_mut().zip(&other.rows) {
            r.difference_with(s);
        }
    }

    pub fn complement(&mut self) {
        for row in &mut self.rows {
            row.complement();
        }
    }

    pub fn inverse(&self) -> Self {
        let mut result = Self::empty(self.num_objects());
        for (a, b) in self.iter() {
            result.insert(b, a);
        }
        result
    }

    /// Relational composition: `(a, c)` such that `(a, b)` is in `self` and
    /// `(b, c)` is in `other` for some `b`.
    pub fn compose(&self, other: &Self) -> Self {
        let n = self.num_objects();
        let mut result = Self::empty(n);
        for a in 0..n {
            for b in self.rows[a].iter() {
                result.rows[a].union_with(&other.rows[b]);
            }
        }
        result
    }

    /// Keep only the pairs whose second object is in `concept`.
    pub fn restrict(&mut self, concept: &ConceptDenotation) {
        for row in &mut self.rows {
            row.intersect_with(concept.bits());
        }
    }

    /// Transitive closure, by Warshall's algorithm over successor rows.
    pub fn transitive_closure(&self) -> Self {
        let n = self.num_objects();
        let mut rows = self.rows.clone();
        for k in 0..n {
            let through = rows[k].clone();
            for row in rows.iter_mut() {
                if row.contains(k) {
                    row.union_with(&through);
                }
            }
        }
        Self { rows }
    }

    /// Transitive closure over paths whose intermediate objects are in `through`.
    pub fn transitive_closure_through(&self, through: &ConceptDenotation) -> Self {
        let mut rows = self.rows.clone();
        for k in through.iter() {
            let successors = rows[k].clone();
            for row in rows.iter_mut() {
                if row.contains(k) {
                    row.union_with(&successors);
                }
            }
        }
        Self { rows }
    }

    pub fn transitive_reflexive_closure(&self) -> Self {
        let mut result = self.transitive_closure();
        for a in 0..result.num_objects() {
            result.insert(a, a);
        }
        result
    }
}

/// The value of an expression in one state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Denotation {
    Concept(ConceptDenotation),
    Role(RoleDenotation),
    Boolean(bool),
    Numerical(u32),
}

impl Denotation {
    pub fn kind(&self) -> ElementKind {
        match self {
            Denotation::Concept(_) => ElementKind::Concept,
            Denotation::Role(_) => ElementKind::Role,
            Denotation::Boolean(_) => ElementKind::Boolean,
            Denotation::Numerical(_) => ElementKind::Numerical,
        }
    }

    pub fn as_concept(&self) -> Option<&ConceptDenotation> {
        match self {
            Denotation::Concept(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&RoleDenotation> {
        match self {
            Denotation::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match *self {
            Denotation::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_numerical(&self) -> Option<u32> {
        match *self {
            Denotation::Numerical(n) => Some(n),
            _ => None,
        }
    }
}

/// Denotations of one expression over every state of a sample, in sample order.
pub type DenotationVector = Vec<Denotation>;

/// The value of a feature in one state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    Boolean(bool),
    Numerical(u32),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FeatureValue::Boolean(b) => write!(f, "{}", b),
            FeatureValue::Numerical(INFINITY) => write!(f, "inf"),
            FeatureValue::Numerical(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(n: usize, pairs: &[(usize, usize)]) -> RoleDenotation {
        let mut r = RoleDenotation::empty(n);
        for &(a, b) in pairs {
            r.insert(a, b);
        }
        r
    }

    #[test]
    fn test_role_basics() {
        let r = role(3, &[(0, 1), (1, 2)]);
        assert_eq!(r.len(), 2);
        assert!(r.contains(0, 1));
        assert!(!r.contains(1, 0));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
        assert_eq!(r.inverse(), role(3, &[(1, 0), (2, 1)]));
    }

    #[test]
    fn test_compose() {
        let r = role(3, &[(0, 1), (1, 2)]);
        assert_eq!(r.compose(&r), role(3, &[(0, 2)]));
    }

    #[test]
    fn test_transitive_closure() {
        let r = role(4, &[(0, 1), (1, 2), (2, 3)]);
        let closure = r.transitive_closure();
        assert_eq!(
            closure,
            role(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
        );
        let reflexive = r.transitive_reflexive_closure();
        assert_eq!(reflexive.len(), 10);
        assert!(reflexive.contains(3, 3));
    }

    #[test]
    fn test_transitive_closure_cycle() {
        let r = role(2, &[(0, 1), (1, 0)]);
        assert_eq!(r.transitive_closure(), RoleDenotation::full(2));
    }

    #[test]
    fn test_complement() {
        let mut r = role(2, &[(0, 1)]);
        r.complement();
        assert_eq!(r, role(2, &[(0, 0), (1, 0), (1, 1)]));
    }

    #[test]
    fn test_restrict() {
        let mut r = role(3, &[(0, 1), (0, 2), (1, 2)]);
        let mut c = ConceptDenotation::empty(3);
        c.insert(1);
        r.restrict(&c);
        assert_eq!(r, role(3, &[(0, 1)]));
    }

    #[test]
    fn test_feature_value_display() {
        assert_eq!(FeatureValue::Numerical(INFINITY).to_string(), "inf");
        assert_eq!(FeatureValue::Numerical(3).to_string(), "3");
        assert_eq!(FeatureValue::Boolean(true).to_string(), "true");
    }
}
