//! The expression factory: hash-consed construction of concepts, roles,
//! booleans and numericals.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;

use log::trace;

use crate::error::ConstructionError;
use crate::node::{Handle, Node};
use crate::reference::{Boolean, Concept, Element, ElementKind, Numerical, Role};
use crate::rules::Rule;
use crate::table::Table;
use crate::types::{ConstantId, PredicateId};
use crate::vocabulary::Vocabulary;

/// Canonicalizing constructor for description-logic expressions.
///
/// Every expression is stored once: building a structurally equal expression
/// twice returns the same handle. The table only grows, so handles stay valid
/// for the lifetime of the factory, across any number of generation runs.
pub struct ElementFactory {
    vocabulary: Arc<Vocabulary>,
    table: RefCell<Table<Node>>,
    complexity: RefCell<Vec<u32>>,
}

impl ElementFactory {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self::with_capacity(vocabulary, 12)
    }

    /// Create a factory whose unique table starts with `2^bits` buckets.
    pub fn with_capacity(vocabulary: Arc<Vocabulary>, bits: usize) -> Self {
        Self {
            vocabulary,
            table: RefCell::new(Table::new(bits)),
            complexity: RefCell::new(Vec::new()),
        }
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// Number of distinct expressions built so far.
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }

    /// All expressions, in construction order.
    pub fn elements(&self) -> Vec<Element> {
        self.table
            .borrow()
            .iter()
            .map(|(index, node)| Element::from_kind(node.kind(), index as u32))
            .collect()
    }

    pub fn node(&self, element: impl Into<Element>) -> Node {
        let element = element.into();
        *self.table.borrow().value(element.index() as usize)
    }

    /// Number of grammar rule applications needed to build the expression.
    pub fn complexity(&self, element: impl Into<Element>) -> u32 {
        let element = element.into();
        assert_ne!(element.index(), 0, "Index is 0");
        self.complexity.borrow()[element.index() as usize - 1]
    }

    /// Intern a node, returning its handle and whether it was newly created.
    ///
    /// Operands of commutative rules are put in structural order first.
    pub(crate) fn intern(&self, node: Node) -> (Element, bool) {
        let size_before = self.len();
        for child in node.children() {
            assert!(
                child.index() as usize >= 1 && child.index() as usize <= size_before,
                "Child {} does not belong to this factory",
                child
            );
        }
        let node = self.canonical(node);
        let children = node.children();

        let index = self.table.borrow_mut().put(node);
        let fresh = index > size_before;
        if fresh {
            let complexity = 1 + children.iter().map(|&c| self.complexity(c)).sum::<u32>();
            self.complexity.borrow_mut().push(complexity);
            trace!("intern: {:?} => {} (complexity {})", node, index, complexity);
        }
        (Element::from_kind(node.kind(), index as u32), fresh)
    }

    /// Total order on expressions that depends only on their structure:
    /// rule, then symbols, then children left to right.
    ///
    /// Unlike handle indices, it is the same in every factory over the same
    /// vocabulary, so it gives commutative expressions one textual form.
    pub fn structural_cmp(&self, a: impl Into<Element>, b: impl Into<Element>) -> Ordering {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Ordering::Equal;
        }
        let (x, y) = (self.node(a), self.node(b));
        x.rule()
            .cmp(&y.rule())
            .then_with(|| x.symbols().cmp(&y.symbols()))
            .then_with(|| {
                let (xs, ys) = (x.children(), y.children());
                xs.iter()
                    .zip(&ys)
                    .map(|(&p, &q)| p.kind().cmp(&q.kind()).then_with(|| self.structural_cmp(p, q)))
                    .find(|o| o.is_ne())
                    .unwrap_or_else(|| xs.len().cmp(&ys.len()))
            })
    }

    /// Put the operands of commutative rules in structural order.
    fn canonical(&self, node: Node) -> Node {
        let ordered = |a: Element, b: Element| self.structural_cmp(a, b) != Ordering::Greater;
        match node {
            Node::AndConcept(a, b) if !ordered(a.into(), b.into()) => Node::AndConcept(b, a),
            Node::OrConcept(a, b) if !ordered(a.into(), b.into()) => Node::OrConcept(b, a),
            Node::EqualConcept(a, b) if !ordered(a.into(), b.into()) => Node::EqualConcept(b, a),
            Node::AndRole(a, b) if !ordered(a.into(), b.into()) => Node::AndRole(b, a),
            Node::OrRole(a, b) if !ordered(a.into(), b.into()) => Node::OrRole(b, a),
            other => other,
        }
    }

    fn mk<H: Handle>(&self, node: Node) -> H {
        let (element, _) = self.intern(node);
        H::from_element(element)
            .unwrap_or_else(|| unreachable!("{:?} has kind {}", node, element.kind()))
    }

    fn predicate_arity(&self, predicate: PredicateId) -> Result<usize, ConstructionError> {
        if !self.vocabulary.contains_predicate(predicate) {
            return Err(ConstructionError::UnknownPredicate {
                name: predicate.to_string(),
            });
        }
        Ok(self.vocabulary.predicate(predicate).arity())
    }

    fn invalid_arity(&self, predicate: PredicateId, expected: String) -> ConstructionError {
        let p = self.vocabulary.predicate(predicate);
        ConstructionError::InvalidArity {
            predicate: p.name().to_string(),
            arity: p.arity(),
            expected,
        }
    }

    /// Build the primitive of the given kind over a predicate.
    ///
    /// A concept needs a unary predicate, a role a binary one and a boolean a
    /// nullary one. There are no numerical primitives.
    pub fn make_primitive(
        &self,
        predicate: PredicateId,
        kind: ElementKind,
    ) -> Result<Element, ConstructionError> {
        let arity = self.predicate_arity(predicate)?;
        let expected = match kind {
            ElementKind::Concept if arity == 1 => {
                return self.mk_primitive_concept(predicate, 0).map(Element::from)
            }
            ElementKind::Role if arity == 2 => {
                return self.mk_primitive_role(predicate, 0, 1).map(Element::from)
            }
            ElementKind::Boolean if arity == 0 => {
                return self.mk_nullary_boolean(predicate).map(Element::from)
            }
            ElementKind::Concept => "a concept primitive needs arity 1",
            ElementKind::Role => "a role primitive needs arity 2",
            ElementKind::Boolean => "a boolean primitive needs arity 0",
            ElementKind::Numerical => "there are no numerical primitives",
        };
        Err(self.invalid_arity(predicate, expected.to_string()))
    }

    /// `c_primitive(p, pos)`: the objects at position `pos` of the true `p` atoms.
    pub fn mk_primitive_concept(
        &self,
        predicate: PredicateId,
        pos: u32,
    ) -> Result<Concept, ConstructionError> {
        let arity = self.predicate_arity(predicate)?;
        if pos as usize >= arity {
            return Err(self.invalid_arity(predicate, format!("position {} is out of range", pos)));
        }
        Ok(self.mk(Node::PrimitiveConcept { predicate, pos }))
    }

    /// `r_primitive(p, pos1, pos2)`: the object pairs at the two positions of
    /// the true `p` atoms.
    pub fn mk_primitive_role(
        &self,
        predicate: PredicateId,
        pos1: u32,
        pos2: u32,
    ) -> Result<Role, ConstructionError> {
        let arity = self.predicate_arity(predicate)?;
        for pos in [pos1, pos2] {
            if pos as usize >= arity {
                return Err(self.invalid_arity(predicate, format!("position {} is out of range", pos)));
            }
        }
        Ok(self.mk(Node::PrimitiveRole { predicate, pos1, pos2 }))
    }

    pub fn mk_nullary_boolean(&self, predicate: PredicateId) -> Result<Boolean, ConstructionError> {
        let arity = self.predicate_arity(predicate)?;
        if arity != 0 {
            return Err(self.invalid_arity(predicate, "a boolean primitive needs arity 0".to_string()));
        }
        Ok(self.mk(Node::NullaryBoolean(predicate)))
    }

    pub fn mk_bot_concept(&self) -> Concept {
        self.mk(Node::BotConcept)
    }

    pub fn mk_top_concept(&self) -> Concept {
        self.mk(Node::TopConcept)
    }

    pub fn mk_one_of_concept(&self, constant: ConstantId) -> Result<Concept, ConstructionError> {
        if constant.index() >= self.vocabulary.constants().len() {
            return Err(ConstructionError::UnknownConstant {
                name: constant.to_string(),
            });
        }
        Ok(self.mk(Node::OneOfConcept(constant)))
    }

    pub fn mk_not_concept(&self, c: Concept) -> Concept {
        self.mk(Node::NotConcept(c))
    }

    pub fn mk_and_concept(&self, c: Concept, d: Concept) -> Concept {
        self.mk(Node::AndConcept(c, d))
    }

    pub fn mk_or_concept(&self, c: Concept, d: Concept) -> Concept {
        self.mk(Node::OrConcept(c, d))
    }

    pub fn mk_diff_concept(&self, c: Concept, d: Concept) -> Concept {
        self.mk(Node::DiffConcept(c, d))
    }

    /// `c_projection(R, pos)`: the objects at position `pos` (0 or 1) of R's pairs.
    pub fn mk_projection_concept(&self, r: Role, pos: u32) -> Result<Concept, ConstructionError> {
        if pos > 1 {
            return Err(ConstructionError::TypeMismatch {
                rule: Rule::ProjectionConcept.name(),
                expected: "(role, position) with position 0 or 1",
                found: format!("{}, {}", r, pos),
            });
        }
        Ok(self.mk(Node::ProjectionConcept(r, pos)))
    }

    pub fn mk_some_concept(&self, r: Role, c: Concept) -> Concept {
        self.mk(Node::SomeConcept(r, c))
    }

    pub fn mk_all_concept(&self, r: Role, c: Concept) -> Concept {
        self.mk(Node::AllConcept(r, c))
    }

    pub fn mk_equal_concept(&self, r: Role, s: Role) -> Concept {
        self.mk(Node::EqualConcept(r, s))
    }

    pub fn mk_subset_concept(&self, r: Role, s: Role) -> Concept {
        self.mk(Node::SubsetConcept(r, s))
    }

    pub fn mk_top_role(&self) -> Role {
        self.mk(Node::TopRole)
    }

    pub fn mk_inverse_role(&self, r: Role) -> Role {
        self.mk(Node::InverseRole(r))
    }

    pub fn mk_not_role(&self, r: Role) -> Role {
        self.mk(Node::NotRole(r))
    }

    pub fn mk_and_role(&self, r: Role, s: Role) -> Role {
        self.mk(Node::AndRole(r, s))
    }

    pub fn mk_or_role(&self, r: Role, s: Role) -> Role {
        self.mk(Node::OrRole(r, s))
    }

    pub fn mk_diff_role(&self, r: Role, s: Role) -> Role {
        self.mk(Node::DiffRole(r, s))
    }

    pub fn mk_compose_role(&self, r: Role, s: Role) -> Role {
        self.mk(Node::ComposeRole(r, s))
    }

    pub fn mk_identity_role(&self, c: Concept) -> Role {
        self.mk(Node::IdentityRole(c))
    }

    pub fn mk_restrict_role(&self, r: Role, c: Concept) -> Role {
        self.mk(Node::RestrictRole(r, c))
    }

    pub fn mk_transitive_closure_role(&self, r: Role) -> Role {
        self.mk(Node::TransitiveClosureRole(r))
    }

    pub fn mk_transitive_reflexive_closure_role(&self, r: Role) -> Role {
        self.mk(Node::TransitiveReflexiveClosureRole(r))
    }

    /// `r_til_c(R, C)`: pairs joined by an R-path whose intermediate objects are in C.
    pub fn mk_til_c_role(&self, r: Role, c: Concept) -> Role {
        self.mk(Node::TilCRole(r, c))
    }

    pub fn mk_empty_concept_boolean(&self, c: Concept) -> Boolean {
        self.mk(Node::EmptyConceptBoolean(c))
    }

    pub fn mk_empty_role_boolean(&self, r: Role) -> Boolean {
        self.mk(Node::EmptyRoleBoolean(r))
    }

    pub fn mk_inclusion_concept_boolean(&self, c: Concept, d: Concept) -> Boolean {
        self.mk(Node::InclusionConceptBoolean(c, d))
    }

    pub fn mk_inclusion_role_boolean(&self, r: Role, s: Role) -> Boolean {
        self.mk(Node::InclusionRoleBoolean(r, s))
    }

    pub fn mk_count_concept_numerical(&self, c: Concept) -> Numerical {
        self.mk(Node::CountConceptNumerical(c))
    }

    pub fn mk_count_role_numerical(&self, r: Role) -> Numerical {
        self.mk(Node::CountRoleNumerical(r))
    }

    pub fn mk_concept_distance_numerical(&self, c: Concept, r: Role, d: Concept) -> Numerical {
        self.mk(Node::ConceptDistanceNumerical(c, r, d))
    }

    /// Build a composite expression from untyped sub-expressions.
    ///
    /// Fails with [`ConstructionError::TypeMismatch`] when the kinds or the
    /// number of children do not fit the rule, and with
    /// [`ConstructionError::NotComposite`] for rules over symbols.
    pub fn make_composite(&self, rule: Rule, children: &[Element]) -> Result<Element, ConstructionError> {
        use crate::reference::Element::{Concept as C, Role as R};

        if rule.takes_symbols() {
            return Err(ConstructionError::NotComposite { rule: rule.name() });
        }

        let node = match (rule, children) {
            (Rule::NotConcept, &[C(c)]) => Node::NotConcept(c),
            (Rule::AndConcept, &[C(c), C(d)]) => Node::AndConcept(c, d),
            (Rule::OrConcept, &[C(c), C(d)]) => Node::OrConcept(c, d),
            (Rule::DiffConcept, &[C(c), C(d)]) => Node::DiffConcept(c, d),
            (Rule::SomeConcept, &[R(r), C(c)]) => Node::SomeConcept(r, c),
            (Rule::AllConcept, &[R(r), C(c)]) => Node::AllConcept(r, c),
            (Rule::EqualConcept, &[R(r), R(s)]) => Node::EqualConcept(r, s),
            (Rule::SubsetConcept, &[R(r), R(s)]) => Node::SubsetConcept(r, s),
            (Rule::InverseRole, &[R(r)]) => Node::InverseRole(r),
            (Rule::NotRole, &[R(r)]) => Node::NotRole(r),
            (Rule::AndRole, &[R(r), R(s)]) => Node::AndRole(r, s),
            (Rule::OrRole, &[R(r), R(s)]) => Node::OrRole(r, s),
            (Rule::DiffRole, &[R(r), R(s)]) => Node::DiffRole(r, s),
            (Rule::ComposeRole, &[R(r), R(s)]) => Node::ComposeRole(r, s),
            (Rule::IdentityRole, &[C(c)]) => Node::IdentityRole(c),
            (Rule::RestrictRole, &[R(r), C(c)]) => Node::RestrictRole(r, c),
            (Rule::TransitiveClosureRole, &[R(r)]) => Node::TransitiveClosureRole(r),
            (Rule::TransitiveReflexiveClosureRole, &[R(r)]) => Node::TransitiveReflexiveClosureRole(r),
            (Rule::TilCRole, &[R(r), C(c)]) => Node::TilCRole(r, c),
            (Rule::EmptyBoolean, &[C(c)]) => Node::EmptyConceptBoolean(c),
            (Rule::EmptyBoolean, &[R(r)]) => Node::EmptyRoleBoolean(r),
            (Rule::InclusionBoolean, &[C(c), C(d)]) => Node::InclusionConceptBoolean(c, d),
            (Rule::InclusionBoolean, &[R(r), R(s)]) => Node::InclusionRoleBoolean(r, s),
            (Rule::CountNumerical, &[C(c)]) => Node::CountConceptNumerical(c),
            (Rule::CountNumerical, &[R(r)]) => Node::CountRoleNumerical(r),
            (Rule::ConceptDistanceNumerical, &[C(c), R(r), C(d)]) => {
                Node::ConceptDistanceNumerical(c, r, d)
            }
            _ => {
                return Err(ConstructionError::TypeMismatch {
                    rule: rule.name(),
                    expected: rule.signature(),
                    found: children
                        .iter()
                        .map(|c| c.kind().name())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
            }
        };
        Ok(self.intern(node).0)
    }
}

impl Debug for ElementFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("ElementFactory")
            .field("predicates", &self.vocabulary.predicates().len())
            .field("size", &table.len())
            .field("buckets", &table.num_buckets())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn factory() -> ElementFactory {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("on", 2).unwrap();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("arm-empty", 0).unwrap();
        vocabulary.add_constant("table");
        ElementFactory::new(Arc::new(vocabulary))
    }

    fn pred(factory: &ElementFactory, name: &str) -> PredicateId {
        factory.vocabulary().find_predicate(name).unwrap()
    }

    #[test]
    fn test_primitives() {
        let factory = factory();
        let clear = factory.make_primitive(pred(&factory, "clear"), ElementKind::Concept).unwrap();
        let on = factory.make_primitive(pred(&factory, "on"), ElementKind::Role).unwrap();
        let arm = factory.make_primitive(pred(&factory, "arm-empty"), ElementKind::Boolean).unwrap();
        assert_eq!(clear.kind(), ElementKind::Concept);
        assert_eq!(on.kind(), ElementKind::Role);
        assert_eq!(arm.kind(), ElementKind::Boolean);
        assert_eq!(factory.len(), 3);
        assert_eq!(factory.complexity(clear), 1);
    }

    #[test]
    fn test_invalid_arity() {
        let factory = factory();
        let on = pred(&factory, "on");
        assert!(matches!(
            factory.make_primitive(on, ElementKind::Concept),
            Err(ConstructionError::InvalidArity { arity: 2, .. })
        ));
        assert!(matches!(
            factory.make_primitive(on, ElementKind::Boolean),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(matches!(
            factory.mk_primitive_concept(on, 2),
            Err(ConstructionError::InvalidArity { .. })
        ));
        assert!(factory.mk_primitive_concept(on, 1).is_ok());
        assert!(matches!(
            factory.make_primitive(PredicateId::new(42), ElementKind::Concept),
            Err(ConstructionError::UnknownPredicate { .. })
        ));
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_hash_consing() {
        let factory = factory();
        let clear = factory.mk_primitive_concept(pred(&factory, "clear"), 0).unwrap();
        let top = factory.mk_top_concept();
        let a = factory.mk_and_concept(clear, top);
        let b = factory.mk_and_concept(top, clear);
        assert_eq!(a, b);
        let n1 = factory.mk_not_concept(a);
        let n2 = factory.mk_not_concept(b);
        assert_eq!(n1, n2);
        assert_eq!(factory.len(), 4);
        assert_eq!(factory.complexity(n1), 4);
    }

    #[test]
    fn test_commutative_order_is_structural() {
        let text = "c_and(c_primitive(clear,0),c_top)";
        let fresh = factory();
        let first = fresh.parse(text).unwrap();

        // Building `c_top` first gives it the lower index.
        let other = factory();
        other.mk_top_concept();
        let second = other.parse(text).unwrap();
        assert_eq!(fresh.repr(first), other.repr(second));
        assert_eq!(other.repr(second), text);

        let swapped = other.parse("c_and(c_top,c_primitive(clear,0))").unwrap();
        assert_eq!(swapped, second);

        let nested = "r_or(r_primitive(on,0,1),r_inverse(r_primitive(on,0,1)))";
        let e = other.parse("r_or(r_inverse(r_primitive(on,0,1)),r_primitive(on,0,1))").unwrap();
        assert_eq!(other.repr(e), nested);
        assert_eq!(fresh.repr(fresh.parse(nested).unwrap()), nested);
    }

    #[test]
    fn test_structural_cmp() {
        let factory = factory();
        let clear = factory.mk_primitive_concept(pred(&factory, "clear"), 0).unwrap();
        let top = factory.mk_top_concept();
        let bot = factory.mk_bot_concept();
        assert_eq!(factory.structural_cmp(clear, clear), Ordering::Equal);
        assert_eq!(factory.structural_cmp(clear, bot), Ordering::Less);
        assert_eq!(factory.structural_cmp(top, bot), Ordering::Greater);
        let not_top = factory.mk_not_concept(top);
        let not_bot = factory.mk_not_concept(bot);
        assert_eq!(factory.structural_cmp(not_top, not_bot), Ordering::Greater);
    }

    #[test]
    fn test_non_commutative_order_preserved() {
        let factory = factory();
        let clear = factory.mk_primitive_concept(pred(&factory, "clear"), 0).unwrap();
        let top = factory.mk_top_concept();
        assert_ne!(factory.mk_diff_concept(clear, top), factory.mk_diff_concept(top, clear));
    }

    #[test]
    fn test_make_composite() {
        let factory = factory();
        let clear = factory.mk_primitive_concept(pred(&factory, "clear"), 0).unwrap();
        let on = factory.mk_primitive_role(pred(&factory, "on"), 0, 1).unwrap();
        let some = factory
            .make_composite(Rule::SomeConcept, &[on.into(), clear.into()])
            .unwrap();
        assert_eq!(some, Element::from(factory.mk_some_concept(on, clear)));

        let err = factory
            .make_composite(Rule::SomeConcept, &[clear.into(), on.into()])
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::TypeMismatch {
                rule: "c_some",
                expected: "(role, concept)",
                found: "concept, role".to_string(),
            }
        );
        assert!(matches!(
            factory.make_composite(Rule::NotConcept, &[]),
            Err(ConstructionError::TypeMismatch { .. })
        ));
        assert_eq!(
            factory.make_composite(Rule::TopConcept, &[]),
            Err(ConstructionError::NotComposite { rule: "c_top" })
        );

        let count = factory.make_composite(Rule::CountNumerical, &[on.into()]).unwrap();
        assert_eq!(count.kind(), ElementKind::Numerical);
        assert_eq!(factory.complexity(count), 2);
    }

    #[test]
    fn test_one_of_and_projection() {
        let factory = factory();
        let table = factory.vocabulary().find_constant("table").unwrap();
        assert!(factory.mk_one_of_concept(table).is_ok());
        assert!(matches!(
            factory.mk_one_of_concept(ConstantId::new(5)),
            Err(ConstructionError::UnknownConstant { .. })
        ));
        let on = factory.mk_primitive_role(pred(&factory, "on"), 0, 1).unwrap();
        assert!(factory.mk_projection_concept(on, 1).is_ok());
        assert!(factory.mk_projection_concept(on, 2).is_err());
    }

    #[test]
    fn test_elements_in_construction_order() {
        let factory = factory();
        let top = factory.mk_top_concept();
        let r = factory.mk_top_role();
        let n = factory.mk_count_role_numerical(r);
        assert_eq!(factory.elements(), vec![top.into(), r.into(), n.into()]);
        assert_eq!(factory.node(n), Node::CountRoleNumerical(r));
    }
}
