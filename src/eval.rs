//! Denotation evaluation, on single states and over state samples.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::bitset::BitSet;
use crate::cache::HashMapCache;
use crate::denotation::{
    ConceptDenotation, Denotation, DenotationVector, RoleDenotation, INFINITY,
};
use crate::factory::ElementFactory;
use crate::node::Node;
use crate::reference::{Boolean, Concept, Element, Numerical, Role};
use crate::state::State;

/// Read access to the denotations of already evaluated sub-expressions.
pub(crate) trait Children {
    fn concept(&self, c: Concept) -> &ConceptDenotation;
    fn role(&self, r: Role) -> &RoleDenotation;
}

/// Evaluate one node in one state, given the denotations of its children.
pub(crate) fn denote(node: &Node, state: &State, children: &impl Children) -> Denotation {
    let instance = state.instance();
    let n = instance.num_objects();

    match *node {
        Node::PrimitiveConcept { predicate, pos } => {
            let mut result = ConceptDenotation::empty(n);
            for atom in state.true_atoms().filter(|a| a.predicate() == predicate) {
                result.insert(atom.objects()[pos as usize].index());
            }
            Denotation::Concept(result)
        }
        Node::BotConcept => Denotation::Concept(ConceptDenotation::empty(n)),
        Node::TopConcept => Denotation::Concept(ConceptDenotation::full(n)),
        Node::OneOfConcept(constant) => {
            let mut result = ConceptDenotation::empty(n);
            if let Some(object) = instance.constant_object(constant) {
                result.insert(object.index());
            }
            Denotation::Concept(result)
        }
        Node::NotConcept(c) => {
            let mut result = children.concept(c).clone();
            result.bits_mut().complement();
            Denotation::Concept(result)
        }
        Node::AndConcept(c, d) => {
            let mut result = children.concept(c).clone();
            result.bits_mut().intersect_with(children.concept(d).bits());
            Denotation::Concept(result)
        }
        Node::OrConcept(c, d) => {
            let mut result = children.concept(c).clone();
            result.bits_mut().union_with(children.concept(d).bits());
            Denotation::Concept(result)
        }
        Node::DiffConcept(c, d) => {
            let mut result = children.concept(c).clone();
            result.bits_mut().difference_with(children.concept(d).bits());
            Denotation::Concept(result)
        }
        Node::ProjectionConcept(r, pos) => {
            let r = children.role(r);
            let mut result = ConceptDenotation::empty(n);
            for (a, b) in r.iter() {
                result.insert(if pos == 0 { a } else { b });
            }
            Denotation::Concept(result)
        }
        Node::SomeConcept(r, c) => {
            let (r, c) = (children.role(r), children.concept(c));
            concept_where(n, |a| r.successors(a).intersects(c.bits()))
        }
        Node::AllConcept(r, c) => {
            let (r, c) = (children.role(r), children.concept(c));
            concept_where(n, |a| r.successors(a).is_subset(c.bits()))
        }
        Node::EqualConcept(r, s) => {
            let (r, s) = (children.role(r), children.role(s));
            concept_where(n, |a| r.successors(a) == s.successors(a))
        }
        Node::SubsetConcept(r, s) => {
            let (r, s) = (children.role(r), children.role(s));
            concept_where(n, |a| r.successors(a).is_subset(s.successors(a)))
        }

        Node::PrimitiveRole { predicate, pos1, pos2 } => {
            let mut result = RoleDenotation::empty(n);
            for atom in state.true_atoms().filter(|a| a.predicate() == predicate) {
                let objects = atom.objects();
                result.insert(objects[pos1 as usize].index(), objects[pos2 as usize].index());
            }
            Denotation::Role(result)
        }
        Node::TopRole => Denotation::Role(RoleDenotation::full(n)),
        Node::InverseRole(r) => Denotation::Role(children.role(r).inverse()),
        Node::NotRole(r) => {
            let mut result = children.role(r).clone();
            result.complement();
            Denotation::Role(result)
        }
        Node::AndRole(r, s) => {
            let mut result = children.role(r).clone();
            result.intersect_with(children.role(s));
            Denotation::Role(result)
        }
        Node::OrRole(r, s) => {
            let mut result = children.role(r).clone();
            result.union_with(children.role(s));
            Denotation::Role(result)
        }
        Node::DiffRole(r, s) => {
            let mut result = children.role(r).clone();
            result.difference_with(children.role(s));
            Denotation::Role(result)
        }
        Node::ComposeRole(r, s) => Denotation::Role(children.role(r).compose(children.role(s))),
        Node::IdentityRole(c) => Denotation::Role(RoleDenotation::identity(children.concept(c))),
        Node::RestrictRole(r, c) => {
            let mut result = children.role(r).clone();
            result.restrict(children.concept(c));
            Denotation::Role(result)
        }
        Node::TransitiveClosureRole(r) => Denotation::Role(children.role(r).transitive_closure()),
        Node::TransitiveReflexiveClosureRole(r) => {
            Denotation::Role(children.role(r).transitive_reflexive_closure())
        }
        Node::TilCRole(r, c) => {
            Denotation::Role(children.role(r).transitive_closure_through(children.concept(c)))
        }

        Node::NullaryBoolean(predicate) => {
            Denotation::Boolean(state.true_atoms().any(|a| a.predicate() == predicate))
        }
        Node::EmptyConceptBoolean(c) => Denotation::Boolean(children.concept(c).is_empty()),
        Node::EmptyRoleBoolean(r) => Denotation::Boolean(children.role(r).is_empty()),
        Node::InclusionConceptBoolean(c, d) => {
            Denotation::Boolean(children.concept(c).is_subset(children.concept(d)))
        }
        Node::InclusionRoleBoolean(r, s) => {
            Denotation::Boolean(children.role(r).is_subset(children.role(s)))
        }

        Node::CountConceptNumerical(c) => Denotation::Numerical(children.concept(c).len() as u32),
        Node::CountRoleNumerical(r) => Denotation::Numerical(children.role(r).len() as u32),
        Node::ConceptDistanceNumerical(c, r, d) => Denotation::Numerical(distance(
            children.concept(c),
            children.role(r),
            children.concept(d),
        )),
    }
}

fn concept_where(n: usize, mut pred: impl FnMut(usize) -> bool) -> Denotation {
    let mut result = ConceptDenotation::empty(n);
    for a in 0..n {
        if pred(a) {
            result.insert(a);
        }
    }
    Denotation::Concept(result)
}

/// Length of the shortest `role` path from any object in `from` to any
/// object in `to`, by breadth-first search from all sources at once.
fn distance(from: &ConceptDenotation, role: &RoleDenotation, to: &ConceptDenotation) -> u32 {
    if from.is_empty() {
        return INFINITY;
    }
    if from.bits().intersects(to.bits()) {
        return 0;
    }

    let mut visited: BitSet = from.bits().clone();
    let mut queue: VecDeque<(usize, u32)> = from.iter().map(|a| (a, 0)).collect();
    while let Some((a, depth)) = queue.pop_front() {
        for b in role.successors(a).iter() {
            if to.contains(b) {
                return depth + 1;
            }
            if visited.insert(b) {
                queue.push_back((b, depth + 1));
            }
        }
    }
    INFINITY
}

impl Children for HashMap<u32, Denotation> {
    fn concept(&self, c: Concept) -> &ConceptDenotation {
        self[&c.index()]
            .as_concept()
            .unwrap_or_else(|| unreachable!("{} does not denote a concept", c))
    }

    fn role(&self, r: Role) -> &RoleDenotation {
        self[&r.index()]
            .as_role()
            .unwrap_or_else(|| unreachable!("{} does not denote a role", r))
    }
}

impl ElementFactory {
    /// Evaluate an expression in a single state.
    ///
    /// Shared sub-expressions are evaluated once per call.
    pub fn evaluate(&self, element: impl Into<Element>, state: &State) -> Denotation {
        let element = element.into();
        let mut memo = HashMap::new();
        self.evaluate_into(element, state, &mut memo);
        memo.remove(&element.index())
            .unwrap_or_else(|| unreachable!("{} was not evaluated", element))
    }

    fn evaluate_into(&self, element: Element, state: &State, memo: &mut HashMap<u32, Denotation>) {
        if memo.contains_key(&element.index()) {
            return;
        }
        let node = self.node(element);
        for child in node.children() {
            self.evaluate_into(child, state, memo);
        }
        let denotation = denote(&node, state, &*memo);
        memo.insert(element.index(), denotation);
    }

    pub fn evaluate_concept(&self, c: Concept, state: &State) -> ConceptDenotation {
        match self.evaluate(c, state) {
            Denotation::Concept(result) => result,
            other => unreachable!("{} evaluated to {:?}", c, other.kind()),
        }
    }

    pub fn evaluate_role(&self, r: Role, state: &State) -> RoleDenotation {
        match self.evaluate(r, state) {
            Denotation::Role(result) => result,
            other => unreachable!("{} evaluated to {:?}", r, other.kind()),
        }
    }

    pub fn evaluate_boolean(&self, b: Boolean, state: &State) -> bool {
        match self.evaluate(b, state) {
            Denotation::Boolean(result) => result,
            other => unreachable!("{} evaluated to {:?}", b, other.kind()),
        }
    }

    pub fn evaluate_numerical(&self, n: Numerical, state: &State) -> u32 {
        match self.evaluate(n, state) {
            Denotation::Numerical(result) => result,
            other => unreachable!("{} evaluated to {:?}", n, other.kind()),
        }
    }
}

/// Evaluator of denotation vectors over a fixed state sample.
///
/// Vectors are cached by expression index, so every sub-expression is
/// evaluated once per sample.
pub struct SampleEvaluator<'s> {
    states: &'s [State],
    cache: HashMapCache<Arc<DenotationVector>>,
}

impl<'s> SampleEvaluator<'s> {
    pub fn new(states: &'s [State]) -> Self {
        Self {
            states,
            cache: HashMapCache::new(12),
        }
    }

    pub fn states(&self) -> &'s [State] {
        self.states
    }

    pub fn cache(&self) -> &HashMapCache<Arc<DenotationVector>> {
        &self.cache
    }

    /// The denotation vector of an expression, computing and caching it and
    /// any missing sub-expression vectors.
    pub fn evaluate(&mut self, factory: &ElementFactory, element: impl Into<Element>) -> Arc<DenotationVector> {
        let element = element.into();
        if let Some(vector) = self.cache.get(element.index()) {
            return Arc::clone(vector);
        }
        let node = factory.node(element);
        for child in node.children() {
            self.evaluate(factory, child);
        }
        let vector = Arc::new(self.compute(&node));
        self.cache.insert(element.index(), Arc::clone(&vector));
        vector
    }

    /// Compute the vector of a node whose children are already cached.
    ///
    /// Takes `&self` and does not touch the cache, so candidates of one
    /// batch can be computed in parallel.
    pub(crate) fn compute(&self, node: &Node) -> DenotationVector {
        self.states
            .iter()
            .enumerate()
            .map(|(i, state)| {
                let children = CachedChildren {
                    cache: &self.cache,
                    state: i,
                };
                denote(node, state, &children)
            })
            .collect()
    }

    pub(crate) fn insert(&mut self, element: Element, vector: Arc<DenotationVector>) {
        self.cache.insert(element.index(), vector);
    }
}

struct CachedChildren<'a> {
    cache: &'a HashMapCache<Arc<DenotationVector>>,
    state: usize,
}

impl CachedChildren<'_> {
    fn get(&self, element: Element) -> &Denotation {
        let vector = self
            .cache
            .peek(element.index())
            .unwrap_or_else(|| panic!("{} has no cached denotation vector", element));
        &vector[self.state]
    }
}

impl Children for CachedChildren<'_> {
    fn concept(&self, c: Concept) -> &ConceptDenotation {
        self.get(c.into())
            .as_concept()
            .unwrap_or_else(|| unreachable!("{} does not denote a concept", c))
    }

    fn role(&self, r: Role) -> &RoleDenotation {
        self.get(r.into())
            .as_role()
            .unwrap_or_else(|| unreachable!("{} does not denote a role", r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::instance::Instance;
    use crate::vocabulary::Vocabulary;

    struct Blocks {
        factory: ElementFactory,
        instance: Arc<Instance>,
    }

    /// A tower c on b on a, with `a` on the table.
    fn blocks() -> Blocks {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("on", 2).unwrap();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("arm-empty", 0).unwrap();
        vocabulary.add_predicate("block", 1).unwrap();
        vocabulary.add_constant("a");
        let vocabulary = Arc::new(vocabulary);

        let mut instance = Instance::new(0, vocabulary.clone());
        for (x, y) in [("b", "a"), ("c", "b")] {
            instance.add_atom("on", &[x, y]).unwrap();
        }
        for x in ["a", "b", "c"] {
            instance.add_atom("clear", &[x]).unwrap();
            instance.add_static_atom("block", &[x]).unwrap();
        }
        instance.add_atom("arm-empty", &[]).unwrap();
        Blocks {
            factory: ElementFactory::new(vocabulary),
            instance: Arc::new(instance),
        }
    }

    impl Blocks {
        /// Build a state from atom names such as `on(b,a)`.
        fn state(&self, atoms: &[&str]) -> State {
            let ids = atoms.iter().map(|name| {
                self.instance
                    .atoms()
                    .iter()
                    .map(|atom| atom.index())
                    .find(|&id| self.instance.atom_name(id) == *name)
                    .unwrap()
            });
            State::new(self.instance.clone(), ids).unwrap()
        }

        fn tower(&self) -> State {
            self.state(&["on(b,a)", "on(c,b)", "clear(c)", "arm-empty()"])
        }

        fn objects(&self, names: &[&str]) -> ConceptDenotation {
            let mut result = ConceptDenotation::empty(self.instance.num_objects());
            for name in names {
                result.insert(self.instance.find_object(name).unwrap().index());
            }
            result
        }
    }

    #[test]
    fn test_primitives() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        assert_eq!(
            f.evaluate_concept(f.parse_concept("c_primitive(clear,0)").unwrap(), &s),
            blocks.objects(&["c"])
        );
        assert_eq!(
            f.evaluate_concept(f.parse_concept("c_primitive(on,1)").unwrap(), &s),
            blocks.objects(&["a", "b"])
        );
        assert_eq!(
            f.evaluate_concept(f.parse_concept("c_primitive(block,0)").unwrap(), &s),
            blocks.objects(&["a", "b", "c"])
        );
        assert!(f.evaluate_boolean(f.parse_boolean("b_nullary(arm-empty)").unwrap(), &s));
        assert_eq!(
            f.evaluate_concept(f.parse_concept("c_one_of(a)").unwrap(), &s),
            blocks.objects(&["a"])
        );
        let on = f.evaluate_role(f.parse_role("r_primitive(on,0,1)").unwrap(), &s);
        assert_eq!(on.len(), 2);
    }

    #[test]
    fn test_concept_constructors() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        let eval = |text: &str| f.evaluate_concept(f.parse_concept(text).unwrap(), &s);

        assert_eq!(eval("c_not(c_primitive(clear,0))"), blocks.objects(&["a", "b"]));
        assert_eq!(eval("c_bot"), blocks.objects(&[]));
        // Objects with something on them.
        assert_eq!(eval("c_some(r_inverse(r_primitive(on,0,1)),c_top)"), blocks.objects(&["a", "b"]));
        // Every block is on a non-clear block, vacuously for `a`.
        assert_eq!(
            eval("c_all(r_primitive(on,0,1),c_not(c_primitive(clear,0)))"),
            blocks.objects(&["a", "b", "c"])
        );
        assert_eq!(eval("c_projection(r_primitive(on,0,1),0)"), blocks.objects(&["b", "c"]));
        // `a` has no successors in either role.
        assert_eq!(
            eval("c_equal(r_primitive(on,0,1),r_transitive_closure(r_primitive(on,0,1)))"),
            blocks.objects(&["a", "b"])
        );
        assert_eq!(
            eval("c_subset(r_primitive(on,0,1),r_transitive_closure(r_primitive(on,0,1)))"),
            blocks.objects(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_role_constructors() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        let eval = |text: &str| f.evaluate_role(f.parse_role(text).unwrap(), &s);

        assert_eq!(eval("r_transitive_closure(r_primitive(on,0,1))").len(), 3);
        assert_eq!(eval("r_transitive_reflexive_closure(r_primitive(on,0,1))").len(), 6);
        assert_eq!(eval("r_compose(r_primitive(on,0,1),r_primitive(on,0,1))").len(), 1);
        assert_eq!(eval("r_not(r_primitive(on,0,1))").len(), 7);
        assert_eq!(eval("r_top").len(), 9);
        assert_eq!(eval("r_identity(c_primitive(clear,0))").len(), 1);
        assert_eq!(eval("r_restrict(r_primitive(on,0,1),c_one_of(a))").len(), 1);
        assert_eq!(eval("r_diff(r_top,r_primitive(on,0,1))").len(), 7);
    }

    #[test]
    fn test_til_c_role() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        let eval = |text: &str| f.evaluate_role(f.parse_role(text).unwrap(), &s);

        let on = eval("r_primitive(on,0,1)");
        let closure = eval("r_transitive_closure(r_primitive(on,0,1))");
        // No intermediate objects allowed: only direct pairs.
        assert_eq!(eval("r_til_c(r_primitive(on,0,1),c_bot)"), on);
        assert_eq!(eval("r_til_c(r_primitive(on,0,1),c_top)"), closure);
        // `c` reaches `a` only through `b`.
        assert_eq!(eval("r_til_c(r_primitive(on,0,1),c_one_of(a))"), on);
        let through_b = eval("r_til_c(r_primitive(on,0,1),c_some(r_primitive(on,0,1),c_one_of(a)))");
        assert_eq!(through_b, closure);
        assert_eq!(through_b.len(), 3);
    }

    #[test]
    fn test_numericals() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        let eval = |text: &str| f.evaluate_numerical(f.parse_numerical(text).unwrap(), &s);

        assert_eq!(eval("n_count(c_primitive(block,0))"), 3);
        assert_eq!(eval("n_count(r_primitive(on,0,1))"), 2);
        assert_eq!(
            eval("n_concept_distance(c_primitive(clear,0),r_primitive(on,0,1),c_one_of(a))"),
            2
        );
        assert_eq!(
            eval("n_concept_distance(c_one_of(a),r_primitive(on,0,1),c_primitive(clear,0))"),
            INFINITY
        );
        assert_eq!(
            eval("n_concept_distance(c_bot,r_primitive(on,0,1),c_top)"),
            INFINITY
        );
        assert_eq!(
            eval("n_concept_distance(c_top,r_primitive(on,0,1),c_primitive(clear,0))"),
            0
        );
    }

    #[test]
    fn test_booleans() {
        let blocks = blocks();
        let f = &blocks.factory;
        let s = blocks.tower();
        let empty = blocks.state(&["clear(a)"]);
        let b = f.parse_boolean("b_empty(r_primitive(on,0,1))").unwrap();
        assert!(!f.evaluate_boolean(b, &s));
        assert!(f.evaluate_boolean(b, &empty));
        let inc = f
            .parse_boolean("b_inclusion(c_primitive(clear,0),c_primitive(block,0))")
            .unwrap();
        assert!(f.evaluate_boolean(inc, &s));
        let arm = f.parse_boolean("b_nullary(arm-empty)").unwrap();
        assert!(!f.evaluate_boolean(arm, &empty));
    }

    #[test]
    fn test_sample_evaluator_caches() {
        let blocks = blocks();
        let f = &blocks.factory;
        let states = vec![blocks.tower(), blocks.state(&["clear(a)"])];
        let mut evaluator = SampleEvaluator::new(&states);

        let n = f.parse_numerical("n_count(c_not(c_primitive(clear,0)))").unwrap();
        let v = evaluator.evaluate(f, n);
        assert_eq!(*v, vec![Denotation::Numerical(2), Denotation::Numerical(2)]);
        // Three vectors computed: the primitive, its complement and the count.
        assert_eq!(evaluator.cache().len(), 3);
        assert_eq!(evaluator.cache().misses(), 3);

        let again = evaluator.evaluate(f, n);
        assert!(Arc::ptr_eq(&v, &again));
        assert_eq!(evaluator.cache().hits(), 1);

        for (state, d) in states.iter().zip(v.iter()) {
            assert_eq!(&f.evaluate(n, state), d);
        }
    }
}
