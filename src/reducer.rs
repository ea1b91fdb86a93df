//! Equivalence reduction: one representative per denotation vector.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::trace;

use crate::denotation::DenotationVector;
use crate::eval::SampleEvaluator;
use crate::factory::ElementFactory;
use crate::reference::{Element, ElementKind};
use crate::state::State;

/// Outcome of registering an expression with the reducer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Registration {
    /// First expression with this denotation vector; it is now the representative.
    Kept,
    /// Another expression already denotes the same vector over the sample.
    Duplicate(Element),
    /// The expression itself was already registered in this session.
    Known,
}

/// Keeps, per expression kind, the first expression seen for every
/// denotation vector over a state sample.
///
/// Representatives are never replaced, so the earliest registered
/// expression of each equivalence class wins.
pub struct EquivalenceReducer<'s> {
    evaluator: SampleEvaluator<'s>,
    tables: [HashMap<Arc<DenotationVector>, Element>; 4],
    seen: HashSet<u32>,
}

impl<'s> EquivalenceReducer<'s> {
    pub fn new(states: &'s [State]) -> Self {
        Self {
            evaluator: SampleEvaluator::new(states),
            tables: Default::default(),
            seen: HashSet::new(),
        }
    }

    pub fn evaluator(&self) -> &SampleEvaluator<'s> {
        &self.evaluator
    }

    /// Record that an expression has been considered in this session.
    ///
    /// Returns false if it already was.
    pub fn mark_seen(&mut self, element: Element) -> bool {
        self.seen.insert(element.index())
    }

    /// Evaluate an expression over the sample and register it.
    pub fn register(&mut self, factory: &ElementFactory, element: impl Into<Element>) -> Registration {
        let element = element.into();
        if !self.mark_seen(element) {
            return Registration::Known;
        }
        let vector = self.evaluator.evaluate(factory, element);
        self.insert(element, vector)
    }

    /// Register an expression whose vector was computed by the caller.
    ///
    /// The expression must already be marked as seen. Kept expressions have
    /// their vector cached, so later candidates can be built on them.
    pub(crate) fn insert(&mut self, element: Element, vector: Arc<DenotationVector>) -> Registration {
        let table = &mut self.tables[element.kind().slot()];
        if let Some(&representative) = table.get(&vector) {
            trace!("{} duplicates {}", element, representative);
            return Registration::Duplicate(representative);
        }
        table.insert(Arc::clone(&vector), element);
        self.evaluator.insert(element, vector);
        Registration::Kept
    }

    /// The representative of a denotation vector, if any.
    pub fn representative(&self, kind: ElementKind, vector: &DenotationVector) -> Option<Element> {
        self.tables[kind.slot()].get(vector).copied()
    }

    /// Number of kept expressions of a kind.
    pub fn num_kept(&self, kind: ElementKind) -> usize {
        self.tables[kind.slot()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::instance::Instance;
    use crate::vocabulary::Vocabulary;

    #[test]
    fn test_register() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("holding", 1).unwrap();
        let vocabulary = Arc::new(vocabulary);
        let mut instance = Instance::new(0, vocabulary.clone());
        let clear_a = instance.add_atom("clear", &["a"]).unwrap();
        let clear_b = instance.add_atom("clear", &["b"]).unwrap();
        let instance = Arc::new(instance);
        let states = vec![
            State::new(instance.clone(), [clear_a]).unwrap(),
            State::new(instance.clone(), [clear_a, clear_b]).unwrap(),
        ];

        let factory = ElementFactory::new(vocabulary);
        let clear = factory.parse_concept("c_primitive(clear,0)").unwrap();
        let not_not = factory.parse_concept("c_not(c_not(c_primitive(clear,0)))").unwrap();
        let top = factory.mk_top_concept();
        let holding = factory.parse_concept("c_primitive(holding,0)").unwrap();
        let bot = factory.mk_bot_concept();

        let mut reducer = EquivalenceReducer::new(&states);
        assert_eq!(reducer.register(&factory, clear), Registration::Kept);
        assert_eq!(reducer.register(&factory, clear), Registration::Known);
        assert_eq!(reducer.register(&factory, not_not), Registration::Duplicate(clear.into()));
        assert_eq!(reducer.register(&factory, top), Registration::Kept);
        assert_eq!(reducer.register(&factory, holding), Registration::Kept);
        assert_eq!(reducer.register(&factory, bot), Registration::Duplicate(holding.into()));
        assert_eq!(reducer.num_kept(ElementKind::Concept), 3);
        assert_eq!(reducer.num_kept(ElementKind::Role), 0);

        let vector = reducer.evaluator.evaluate(&factory, bot);
        assert_eq!(
            reducer.representative(ElementKind::Concept, &vector),
            Some(holding.into())
        );
    }
}
