//! States: sets of dynamic atoms of one instance.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::ConstructionError;
use crate::instance::{Atom, Instance};
use crate::types::AtomId;

/// A state of a planning instance.
///
/// The state stores its dynamic atoms sorted and deduplicated; the static
/// atoms of the instance are implicitly true. States compare and hash by
/// `(instance index, atoms)`.
#[derive(Debug, Clone)]
pub struct State {
    instance: Arc<Instance>,
    atoms: Vec<AtomId>,
}

impl State {
    pub fn new(
        instance: Arc<Instance>,
        atoms: impl IntoIterator<Item = AtomId>,
    ) -> Result<Self, ConstructionError> {
        let mut atoms: Vec<AtomId> = atoms.into_iter().collect();
        atoms.sort_unstable();
        atoms.dedup();

        for &atom in &atoms {
            if atom.index() >= instance.atoms().len() {
                return Err(ConstructionError::ForeignAtom {
                    atom: atom.id(),
                    instance: instance.index().id(),
                });
            }
            if instance.atom(atom).is_static() {
                return Err(ConstructionError::StaticAtomInState {
                    atom: instance.atom_name(atom),
                });
            }
        }

        Ok(Self { instance, atoms })
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// The dynamic atoms of this state, in increasing index order.
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Iterate over every atom true in this state, static atoms included.
    pub fn true_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.atoms
            .iter()
            .chain(self.instance.static_atoms())
            .map(move |&index| self.instance.atom(index))
    }

    /// Check whether an atom is true in this state.
    pub fn contains(&self, atom: AtomId) -> bool {
        if atom.index() >= self.instance.atoms().len() {
            return false;
        }
        self.instance.atom(atom).is_static() || self.atoms.binary_search(&atom).is_ok()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.instance.index() == other.instance.index() && self.atoms == other.atoms
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instance.index().hash(state);
        self.atoms.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, &atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.instance.atom_name(atom))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn instance() -> Arc<Instance> {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("block", 1).unwrap();
        let mut instance = Instance::new(0, Arc::new(vocabulary));
        instance.add_atom("clear", &["a"]).unwrap();
        instance.add_atom("clear", &["b"]).unwrap();
        instance.add_static_atom("block", &["a"]).unwrap();
        Arc::new(instance)
    }

    #[test]
    fn test_state_sorted_and_deduplicated() {
        let instance = instance();
        let s = State::new(instance.clone(), [AtomId::new(1), AtomId::new(0), AtomId::new(1)]).unwrap();
        assert_eq!(s.atoms(), &[AtomId::new(0), AtomId::new(1)]);
        assert_eq!(s.to_string(), "{clear(a), clear(b)}");
    }

    #[test]
    fn test_state_contains_static() {
        let instance = instance();
        let s = State::new(instance.clone(), [AtomId::new(0)]).unwrap();
        assert!(s.contains(AtomId::new(0)));
        assert!(!s.contains(AtomId::new(1)));
        assert!(s.contains(AtomId::new(2)));
        assert_eq!(s.true_atoms().count(), 2);
    }

    #[test]
    fn test_state_equality() {
        let instance = instance();
        let s1 = State::new(instance.clone(), [AtomId::new(0), AtomId::new(1)]).unwrap();
        let s2 = State::new(instance.clone(), [AtomId::new(1), AtomId::new(0)]).unwrap();
        let s3 = State::new(instance, [AtomId::new(1)]).unwrap();
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
    }

    #[test]
    fn test_state_rejects_bad_atoms() {
        let instance = instance();
        assert_eq!(
            State::new(instance.clone(), [AtomId::new(9)]).unwrap_err(),
            ConstructionError::ForeignAtom { atom: 9, instance: 0 }
        );
        assert_eq!(
            State::new(instance, [AtomId::new(2)]).unwrap_err(),
            ConstructionError::StaticAtomInState {
                atom: "block(a)".to_string()
            }
        );
    }
}
