//! Problem instances: objects and ground atoms over a vocabulary.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConstructionError;
use crate::types::{AtomId, ConstantId, InstanceId, ObjectId, PredicateId};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    index: ObjectId,
    name: String,
}

impl Object {
    pub fn index(&self) -> ObjectId {
        self.index
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A predicate applied to a tuple of objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    index: AtomId,
    predicate: PredicateId,
    objects: Vec<ObjectId>,
    is_static: bool,
}

impl Atom {
    pub fn index(&self) -> AtomId {
        self.index
    }
    pub fn predicate(&self) -> PredicateId {
        self.predicate
    }
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }
    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// A concrete planning problem over a [`Vocabulary`].
///
/// Objects are created on first mention by [`add_atom`](Instance::add_atom),
/// and every vocabulary constant is an object of every instance.
#[derive(Debug, Clone)]
pub struct Instance {
    index: InstanceId,
    vocabulary: Arc<Vocabulary>,
    objects: Vec<Object>,
    object_by_name: HashMap<String, ObjectId>,
    atoms: Vec<Atom>,
    atom_by_key: HashMap<(PredicateId, Vec<ObjectId>), AtomId>,
    static_atoms: Vec<AtomId>,
}

impl Instance {
    /// Create an empty instance.
    ///
    /// The caller must ensure that `index` is unique among all instances
    /// whose states are mixed in one sample.
    pub fn new(index: u32, vocabulary: Arc<Vocabulary>) -> Self {
        let mut instance = Self {
            index: InstanceId::new(index),
            vocabulary,
            objects: Vec::new(),
            object_by_name: HashMap::new(),
            atoms: Vec::new(),
            atom_by_key: HashMap::new(),
            static_atoms: Vec::new(),
        };
        let constants: Vec<String> = instance
            .vocabulary
            .constants()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        for name in constants {
            instance.add_object(&name);
        }
        instance
    }

    pub fn index(&self) -> InstanceId {
        self.index
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// Add an object, returning the existing index if the name is known.
    pub fn add_object(&mut self, name: &str) -> ObjectId {
        if let Some(&index) = self.object_by_name.get(name) {
            return index;
        }
        let index = ObjectId::new(self.objects.len() as u32);
        self.objects.push(Object {
            index,
            name: name.to_string(),
        });
        self.object_by_name.insert(name.to_string(), index);
        index
    }

    /// Add a dynamic atom.
    pub fn add_atom(
        &mut self,
        predicate: &str,
        objects: &[&str],
    ) -> Result<AtomId, ConstructionError> {
        self.add_atom_impl(predicate, objects, false)
    }

    /// Add a static atom, true in every state of this instance.
    pub fn add_static_atom(
        &mut self,
        predicate: &str,
        objects: &[&str],
    ) -> Result<AtomId, ConstructionError> {
        self.add_atom_impl(predicate, objects, true)
    }

    fn add_atom_impl(
        &mut self,
        predicate_name: &str,
        object_names: &[&str],
        is_static: bool,
    ) -> Result<AtomId, ConstructionError> {
        let predicate = self.vocabulary.find_predicate(predicate_name).ok_or_else(|| {
            ConstructionError::UnknownPredicate {
                name: predicate_name.to_string(),
            }
        })?;
        let arity = self.vocabulary.predicate(predicate).arity();
        if arity != object_names.len() {
            return Err(ConstructionError::AtomArity {
                predicate: predicate_name.to_string(),
                arity,
                got: object_names.len(),
            });
        }

        let objects: Vec<ObjectId> = object_names.iter().map(|name| self.add_object(name)).collect();
        let key = (predicate, objects);
        if let Some(&index) = self.atom_by_key.get(&key) {
            if self.atoms[index.index()].is_static != is_static {
                return Err(ConstructionError::ConflictingAtom {
                    atom: self.atom_name(index),
                });
            }
            return Ok(index);
        }

        let index = AtomId::new(self.atoms.len() as u32);
        self.atoms.push(Atom {
            index,
            predicate,
            objects: key.1.clone(),
            is_static,
        });
        self.atom_by_key.insert(key, index);
        if is_static {
            self.static_atoms.push(index);
        }
        Ok(index)
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, index: ObjectId) -> &Object {
        &self.objects[index.index()]
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.object_by_name.get(name).copied()
    }

    /// The object standing for a vocabulary constant.
    pub fn constant_object(&self, constant: ConstantId) -> Option<ObjectId> {
        let name = self.vocabulary.constant(constant).name();
        self.find_object(name)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: AtomId) -> &Atom {
        &self.atoms[index.index()]
    }

    pub fn static_atoms(&self) -> &[AtomId] {
        &self.static_atoms
    }

    /// Look up an atom by predicate and object names.
    pub fn find_atom(&self, predicate: &str, objects: &[&str]) -> Option<AtomId> {
        let predicate = self.vocabulary.find_predicate(predicate)?;
        let objects = objects
            .iter()
            .map(|name| self.find_object(name))
            .collect::<Option<Vec<_>>>()?;
        self.atom_by_key.get(&(predicate, objects)).copied()
    }

    /// Render an atom as `name(o1,o2)`.
    pub fn atom_name(&self, index: AtomId) -> String {
        AtomDisplay {
            instance: self,
            atom: self.atom(index),
        }
        .to_string()
    }
}

struct AtomDisplay<'a> {
    instance: &'a Instance,
    atom: &'a Atom,
}

impl fmt::Display for AtomDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicate = self.instance.vocabulary.predicate(self.atom.predicate);
        write!(f, "{}(", predicate.name())?;
        for (i, &object) in self.atom.objects.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", self.instance.object(object).name())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks_vocabulary() -> Arc<Vocabulary> {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("on", 2).unwrap();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("arm-empty", 0).unwrap();
        vocabulary.add_constant("table");
        Arc::new(vocabulary)
    }

    #[test]
    fn test_add_atom() {
        let mut instance = Instance::new(0, blocks_vocabulary());
        let on_ab = instance.add_atom("on", &["a", "b"]).unwrap();
        let clear_a = instance.add_atom("clear", &["a"]).unwrap();
        assert_ne!(on_ab, clear_a);
        assert_eq!(instance.add_atom("on", &["a", "b"]).unwrap(), on_ab);
        assert_eq!(instance.atom_name(on_ab), "on(a,b)");
        assert_eq!(instance.find_atom("clear", &["a"]), Some(clear_a));
        assert_eq!(instance.find_atom("clear", &["b"]), None);
        // The constant "table" plus a and b.
        assert_eq!(instance.num_objects(), 3);
    }

    #[test]
    fn test_nullary_atom() {
        let mut instance = Instance::new(0, blocks_vocabulary());
        let arm = instance.add_atom("arm-empty", &[]).unwrap();
        assert_eq!(instance.atom_name(arm), "arm-empty()");
        assert!(instance.atom(arm).objects().is_empty());
    }

    #[test]
    fn test_static_atoms() {
        let mut instance = Instance::new(0, blocks_vocabulary());
        let on = instance.add_static_atom("on", &["a", "table"]).unwrap();
        assert!(instance.atom(on).is_static());
        assert_eq!(instance.static_atoms(), &[on]);
        assert!(matches!(
            instance.add_atom("on", &["a", "table"]),
            Err(ConstructionError::ConflictingAtom { .. })
        ));
    }

    #[test]
    fn test_atom_errors() {
        let mut instance = Instance::new(0, blocks_vocabulary());
        assert_eq!(
            instance.add_atom("holding", &["a"]),
            Err(ConstructionError::UnknownPredicate {
                name: "holding".to_string()
            })
        );
        assert_eq!(
            instance.add_atom("on", &["a"]),
            Err(ConstructionError::AtomArity {
                predicate: "on".to_string(),
                arity: 2,
                got: 1,
            })
        );
    }

    #[test]
    fn test_constant_object() {
        let vocabulary = blocks_vocabulary();
        let table = vocabulary.find_constant("table").unwrap();
        let instance = Instance::new(3, vocabulary);
        assert_eq!(instance.index(), InstanceId::new(3));
        let object = instance.constant_object(table).unwrap();
        assert_eq!(instance.object(object).name(), "table");
    }
}
