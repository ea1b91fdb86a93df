//! Expression nodes stored in the factory's unique table.

use crate::reference::{Boolean, Concept, Element, ElementKind, Numerical, Role};
use crate::rules::Rule;
use crate::types::{ConstantId, PredicateId};
use crate::utils::{pairing4, MyHash};

/// A single expression node.
///
/// Children are typed handles into the same factory, so a node whose children
/// have the wrong kind cannot be built.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Node {
    // Concepts.
    PrimitiveConcept { predicate: PredicateId, pos: u32 },
    BotConcept,
    TopConcept,
    OneOfConcept(ConstantId),
    NotConcept(Concept),
    AndConcept(Concept, Concept),
    OrConcept(Concept, Concept),
    DiffConcept(Concept, Concept),
    ProjectionConcept(Role, u32),
    SomeConcept(Role, Concept),
    AllConcept(Role, Concept),
    EqualConcept(Role, Role),
    SubsetConcept(Role, Role),

    // Roles.
    PrimitiveRole { predicate: PredicateId, pos1: u32, pos2: u32 },
    TopRole,
    InverseRole(Role),
    NotRole(Role),
    AndRole(Role, Role),
    OrRole(Role, Role),
    DiffRole(Role, Role),
    ComposeRole(Role, Role),
    IdentityRole(Concept),
    RestrictRole(Role, Concept),
    TransitiveClosureRole(Role),
    TransitiveReflexiveClosureRole(Role),
    /// `r_til_c(R, C)`: transitive closure of R through objects of C.
    TilCRole(Role, Concept),

    // Booleans.
    NullaryBoolean(PredicateId),
    EmptyConceptBoolean(Concept),
    EmptyRoleBoolean(Role),
    InclusionConceptBoolean(Concept, Concept),
    InclusionRoleBoolean(Role, Role),

    // Numericals.
    CountConceptNumerical(Concept),
    CountRoleNumerical(Role),
    ConceptDistanceNumerical(Concept, Role, Concept),
}

impl Node {
    /// The production rule this node is an instance of.
    pub fn rule(&self) -> Rule {
        match self {
            Node::PrimitiveConcept { .. } => Rule::PrimitiveConcept,
            Node::BotConcept => Rule::BotConcept,
            Node::TopConcept => Rule::TopConcept,
            Node::OneOfConcept(_) => Rule::OneOfConcept,
            Node::NotConcept(_) => Rule::NotConcept,
            Node::AndConcept(..) => Rule::AndConcept,
            Node::OrConcept(..) => Rule::OrConcept,
            Node::DiffConcept(..) => Rule::DiffConcept,
            Node::ProjectionConcept(..) => Rule::ProjectionConcept,
            Node::SomeConcept(..) => Rule::SomeConcept,
            Node::AllConcept(..) => Rule::AllConcept,
            Node::EqualConcept(..) => Rule::EqualConcept,
            Node::SubsetConcept(..) => Rule::SubsetConcept,
            Node::PrimitiveRole { .. } => Rule::PrimitiveRole,
            Node::TopRole => Rule::TopRole,
            Node::InverseRole(_) => Rule::InverseRole,
            Node::NotRole(_) => Rule::NotRole,
            Node::AndRole(..) => Rule::AndRole,
            Node::OrRole(..) => Rule::OrRole,
            Node::DiffRole(..) => Rule::DiffRole,
            Node::ComposeRole(..) => Rule::ComposeRole,
            Node::IdentityRole(_) => Rule::IdentityRole,
            Node::RestrictRole(..) => Rule::RestrictRole,
            Node::TransitiveClosureRole(_) => Rule::TransitiveClosureRole,
            Node::TransitiveReflexiveClosureRole(_) => Rule::TransitiveReflexiveClosureRole,
            Node::TilCRole(..) => Rule::TilCRole,
            Node::NullaryBoolean(_) => Rule::NullaryBoolean,
            Node::EmptyConceptBoolean(_) | Node::EmptyRoleBoolean(_) => Rule::EmptyBoolean,
            Node::InclusionConceptBoolean(..) | Node::InclusionRoleBoolean(..) => {
                Rule::InclusionBoolean
            }
            Node::CountConceptNumerical(_) | Node::CountRoleNumerical(_) => Rule::CountNumerical,
            Node::ConceptDistanceNumerical(..) => Rule::ConceptDistanceNumerical,
        }
    }

    /// The kind of expression this node denotes.
    pub fn kind(&self) -> ElementKind {
        self.rule().kind()
    }

    /// Sub-expressions, left to right.
    pub fn children(&self) -> Vec<Element> {
        match *self {
            Node::PrimitiveConcept { .. }
            | Node::BotConcept
            | Node::TopConcept
            | Node::OneOfConcept(_)
            | Node::PrimitiveRole { .. }
            | Node::TopRole
            | Node::NullaryBoolean(_) => vec![],

            Node::NotConcept(c)
            | Node::IdentityRole(c)
            | Node::EmptyConceptBoolean(c)
            | Node::CountConceptNumerical(c) => vec![c.into()],

            Node::ProjectionConcept(r, _)
            | Node::InverseRole(r)
            | Node::NotRole(r)
            | Node::TransitiveClosureRole(r)
            | Node::TransitiveReflexiveClosureRole(r)
            | Node::EmptyRoleBoolean(r)
            | Node::CountRoleNumerical(r) => vec![r.into()],

            Node::AndConcept(a, b)
            | Node::OrConcept(a, b)
            | Node::DiffConcept(a, b)
            | Node::InclusionConceptBoolean(a, b) => vec![a.into(), b.into()],

            Node::EqualConcept(r, s)
            | Node::SubsetConcept(r, s)
            | Node::AndRole(r, s)
            | Node::OrRole(r, s)
            | Node::DiffRole(r, s)
            | Node::ComposeRole(r, s)
            | Node::InclusionRoleBoolean(r, s) => vec![r.into(), s.into()],

            Node::SomeConcept(r, c)
            | Node::AllConcept(r, c)
            | Node::RestrictRole(r, c)
            | Node::TilCRole(r, c) => vec![r.into(), c.into()],

            Node::ConceptDistanceNumerical(c, r, d) => vec![c.into(), r.into(), d.into()],
        }
    }

    /// Symbol payload (predicate, constant, positions), zero-padded.
    pub(crate) fn symbols(&self) -> [u32; 3] {
        match *self {
            Node::PrimitiveConcept { predicate, pos } => [predicate.id(), pos, 0],
            Node::OneOfConcept(k) => [k.id(), 0, 0],
            Node::ProjectionConcept(_, pos) => [pos, 0, 0],
            Node::PrimitiveRole { predicate, pos1, pos2 } => [predicate.id(), pos1, pos2],
            Node::NullaryBoolean(p) => [p.id(), 0, 0],
            _ => [0; 3],
        }
    }

    /// Tag and up to three payload words, used for hashing.
    fn words(&self) -> (u64, u64, u64, u64) {
        let c = |x: Concept| x.index() as u64;
        let r = |x: Role| x.index() as u64;
        match *self {
            Node::PrimitiveConcept { predicate, pos } => (0, predicate.id() as u64, pos as u64, 0),
            Node::BotConcept => (1, 0, 0, 0),
            Node::TopConcept => (2, 0, 0, 0),
            Node::OneOfConcept(k) => (3, k.id() as u64, 0, 0),
            Node::NotConcept(a) => (4, c(a), 0, 0),
            Node::AndConcept(a, b) => (5, c(a), c(b), 0),
            Node::OrConcept(a, b) => (6, c(a), c(b), 0),
            Node::DiffConcept(a, b) => (7, c(a), c(b), 0),
            Node::ProjectionConcept(a, pos) => (8, r(a), pos as u64, 0),
            Node::SomeConcept(a, b) => (9, r(a), c(b), 0),
            Node::AllConcept(a, b) => (10, r(a), c(b), 0),
            Node::EqualConcept(a, b) => (11, r(a), r(b), 0),
            Node::SubsetConcept(a, b) => (12, r(a), r(b), 0),
            Node::PrimitiveRole { predicate, pos1, pos2 } => {
                (13, predicate.id() as u64, pos1 as u64, pos2 as u64)
            }
            Node::TopRole => (14, 0, 0, 0),
            Node::InverseRole(a) => (15, r(a), 0, 0),
            Node::NotRole(a) => (16, r(a), 0, 0),
            Node::AndRole(a, b) => (17, r(a), r(b), 0),
            Node::OrRole(a, b) => (18, r(a), r(b), 0),
            Node::DiffRole(a, b) => (19, r(a), r(b), 0),
            Node::ComposeRole(a, b) => (20, r(a), r(b), 0),
            Node::IdentityRole(a) => (21, c(a), 0, 0),
            Node::RestrictRole(a, b) => (22, r(a), c(b), 0),
            Node::TransitiveClosureRole(a) => (23, r(a), 0, 0),
            Node::TransitiveReflexiveClosureRole(a) => (24, r(a), 0, 0),
            Node::NullaryBoolean(p) => (25, p.id() as u64, 0, 0),
            Node::EmptyConceptBoolean(a) => (26, c(a), 0, 0),
            Node::EmptyRoleBoolean(a) => (27, r(a), 0, 0),
            Node::InclusionConceptBoolean(a, b) => (28, c(a), c(b), 0),
            Node::InclusionRoleBoolean(a, b) => (29, r(a), r(b), 0),
            Node::CountConceptNumerical(a) => (30, c(a), 0, 0),
            Node::CountRoleNumerical(a) => (31, r(a), 0, 0),
            Node::ConceptDistanceNumerical(a, b, d) => (32, c(a), r(b), c(d)),
            Node::TilCRole(a, b) => (33, r(a), c(b), 0),
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        let (tag, a, b, c) = self.words();
        pairing4(tag, a, b, c)
    }
}

/// Helpers to unwrap handles of a known kind in composite nodes.
pub(crate) trait Handle: Copy {
    fn from_element(e: Element) -> Option<Self>;
}

impl Handle for Concept {
    fn from_element(e: Element) -> Option<Self> {
        e.as_concept()
    }
}

impl Handle for Role {
    fn from_element(e: Element) -> Option<Self> {
        e.as_role()
    }
}

impl Handle for Boolean {
    fn from_element(e: Element) -> Option<Self> {
        e.as_boolean()
    }
}

impl Handle for Numerical {
    fn from_element(e: Element) -> Option<Self> {
        e.as_numerical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_and_kind() {
        let c = Concept::new(1);
        let r = Role::new(2);
        assert_eq!(Node::SomeConcept(r, c).rule(), Rule::SomeConcept);
        assert_eq!(Node::SomeConcept(r, c).kind(), ElementKind::Concept);
        assert_eq!(Node::EmptyRoleBoolean(r).rule(), Rule::EmptyBoolean);
        assert_eq!(Node::CountRoleNumerical(r).kind(), ElementKind::Numerical);
        assert_eq!(Node::IdentityRole(c).kind(), ElementKind::Role);
    }

    #[test]
    fn test_children() {
        let c = Concept::new(1);
        let d = Concept::new(3);
        let r = Role::new(2);
        assert!(Node::TopConcept.children().is_empty());
        assert_eq!(
            Node::ConceptDistanceNumerical(c, r, d).children(),
            vec![Element::from(c), Element::from(r), Element::from(d)]
        );
        assert_eq!(Node::RestrictRole(r, c).children(), vec![Element::from(r), Element::from(c)]);
    }

    #[test]
    fn test_hash_distinguishes_tags() {
        let c = Concept::new(1);
        let r = Role::new(1);
        assert_ne!(MyHash::hash(&Node::NotConcept(c)), MyHash::hash(&Node::InverseRole(r)));
        assert_eq!(
            MyHash::hash(&Node::AndConcept(c, c)),
            MyHash::hash(&Node::AndConcept(Concept::new(1), Concept::new(1)))
        );
    }
}
