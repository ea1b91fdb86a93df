//! Output features.

use std::fmt;

use crate::denotation::FeatureValue;
use crate::factory::ElementFactory;
use crate::reference::{Element, ElementKind};
use crate::state::State;

/// A boolean or numerical expression selected by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Feature {
    element: Element,
    complexity: u32,
    repr: String,
}

impl Feature {
    /// Wrap a boolean or numerical expression.
    ///
    /// # Panics
    ///
    /// Panics if `element` is a concept or a role.
    pub fn new(factory: &ElementFactory, element: impl Into<Element>) -> Self {
        let element = element.into();
        assert!(
            matches!(element.kind(), ElementKind::Boolean | ElementKind::Numerical),
            "{} is not a feature",
            element
        );
        Self {
            element,
            complexity: factory.complexity(element),
            repr: factory.repr(element),
        }
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    pub fn is_boolean(&self) -> bool {
        self.kind() == ElementKind::Boolean
    }

    pub fn is_numerical(&self) -> bool {
        self.kind() == ElementKind::Numerical
    }

    pub fn complexity(&self) -> u32 {
        self.complexity
    }

    /// Canonical textual form; can be parsed back with [`ElementFactory::parse`].
    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Evaluate the feature in a state.
    pub fn evaluate(&self, factory: &ElementFactory, state: &State) -> FeatureValue {
        match self.element {
            Element::Boolean(b) => FeatureValue::Boolean(factory.evaluate_boolean(b, state)),
            Element::Numerical(n) => FeatureValue::Numerical(factory.evaluate_numerical(n, state)),
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::instance::Instance;
    use crate::vocabulary::Vocabulary;

    #[test]
    fn test_feature() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("arm-empty", 0).unwrap();
        let vocabulary = Arc::new(vocabulary);
        let mut instance = Instance::new(0, vocabulary.clone());
        let clear_a = instance.add_atom("clear", &["a"]).unwrap();
        let arm = instance.add_atom("arm-empty", &[]).unwrap();
        let instance = Arc::new(instance);
        let state = State::new(instance, [clear_a, arm]).unwrap();

        let factory = ElementFactory::new(vocabulary);
        let count = Feature::new(&factory, factory.parse("n_count(c_primitive(clear,0))").unwrap());
        assert!(count.is_numerical());
        assert_eq!(count.complexity(), 2);
        assert_eq!(count.to_string(), "n_count(c_primitive(clear,0))");
        assert_eq!(count.evaluate(&factory, &state), FeatureValue::Numerical(1));

        let nullary = Feature::new(&factory, factory.parse("b_nullary(arm-empty)").unwrap());
        assert!(nullary.is_boolean());
        assert_eq!(nullary.evaluate(&factory, &state), FeatureValue::Boolean(true));
    }

    #[test]
    #[should_panic(expected = "is not a feature")]
    fn test_concept_is_not_a_feature() {
        let factory = ElementFactory::new(Arc::new(Vocabulary::new()));
        let top = factory.mk_top_concept();
        Feature::new(&factory, top);
    }
}
