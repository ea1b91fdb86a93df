//! Planning-domain vocabulary: predicates and constants.

use std::collections::HashMap;
use std::fmt;

use crate::error::ConstructionError;
use crate::types::{ConstantId, PredicateId};

/// A predicate symbol with a fixed arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    index: PredicateId,
    name: String,
    arity: usize,
}

impl Predicate {
    pub fn index(&self) -> PredicateId {
        self.index
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A named object shared by every instance of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constant {
    index: ConstantId,
    name: String,
}

impl Constant {
    pub fn index(&self) -> ConstantId {
        self.index
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The ordered set of predicates and constants of a planning domain.
///
/// Predicates are identified by name; declaring the same name twice with the
/// same arity returns the existing index. The declaration order fixes the
/// order in which primitives are enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    predicates: Vec<Predicate>,
    predicate_by_name: HashMap<String, PredicateId>,
    constants: Vec<Constant>,
    constant_by_name: HashMap<String, ConstantId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a predicate.
    pub fn add_predicate(
        &mut self,
        name: &str,
        arity: usize,
    ) -> Result<PredicateId, ConstructionError> {
        if let Some(&index) = self.predicate_by_name.get(name) {
            let existing = self.predicates[index.index()].arity;
            if existing != arity {
                return Err(ConstructionError::ConflictingPredicate {
                    name: name.to_string(),
                    arity,
                    existing,
                });
            }
            return Ok(index);
        }

        let index = PredicateId::new(self.predicates.len() as u32);
        self.predicates.push(Predicate {
            index,
            name: name.to_string(),
            arity,
        });
        self.predicate_by_name.insert(name.to_string(), index);
        Ok(index)
    }

    /// Declare a constant.
    pub fn add_constant(&mut self, name: &str) -> ConstantId {
        if let Some(&index) = self.constant_by_name.get(name) {
            return index;
        }
        let index = ConstantId::new(self.constants.len() as u32);
        self.constants.push(Constant {
            index,
            name: name.to_string(),
        });
        self.constant_by_name.insert(name.to_string(), index);
        index
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn predicate(&self, index: PredicateId) -> &Predicate {
        &self.predicates[index.index()]
    }

    pub fn find_predicate(&self, name: &str) -> Option<PredicateId> {
        self.predicate_by_name.get(name).copied()
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn constant(&self, index: ConstantId) -> &Constant {
        &self.constants[index.index()]
    }

    pub fn find_constant(&self, name: &str) -> Option<ConstantId> {
        self.constant_by_name.get(name).copied()
    }

    /// Check that a predicate index was issued by this vocabulary.
    pub fn contains_predicate(&self, index: PredicateId) -> bool {
        index.index() < self.predicates.len()
    }
}
