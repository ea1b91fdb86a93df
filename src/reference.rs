//! Typed handles to expressions stored in an [`ElementFactory`][crate::factory::ElementFactory].
//!
//! A handle is a 1-based index into the factory's unique table, tagged with
//! the kind of expression it refers to. Handles are only meaningful for the
//! factory that issued them.

use std::fmt::{Display, Formatter};

/// The four kinds of description-logic expressions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ElementKind {
    Concept,
    Role,
    Boolean,
    Numerical,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Concept,
        ElementKind::Role,
        ElementKind::Boolean,
        ElementKind::Numerical,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Concept => "concept",
            ElementKind::Role => "role",
            ElementKind::Boolean => "boolean",
            ElementKind::Numerical => "numerical",
        }
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the index of the expression in the factory.
            pub const fn index(self) -> u32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "@{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle to a concept: denotes a set of objects.
    Concept,
    "C"
);
handle!(
    /// Handle to a role: denotes a set of object pairs.
    Role,
    "R"
);
handle!(
    /// Handle to a boolean feature.
    Boolean,
    "B"
);
handle!(
    /// Handle to a numerical feature.
    Numerical,
    "N"
);

/// A handle of any kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Element {
    Concept(Concept),
    Role(Role),
    Boolean(Boolean),
    Numerical(Numerical),
}

impl Element {
    pub(crate) fn from_kind(kind: ElementKind, index: u32) -> Self {
        match kind {
            ElementKind::Concept => Element::Concept(Concept::new(index)),
            ElementKind::Role => Element::Role(Role::new(index)),
            ElementKind::Boolean => Element::Boolean(Boolean::new(index)),
            ElementKind::Numerical => Element::Numerical(Numerical::new(index)),
        }
    }

    pub fn kind(self) -> ElementKind {
        match self {
            Element::Concept(_) => ElementKind::Concept,
            Element::Role(_) => ElementKind::Role,
            Element::Boolean(_) => ElementKind::Boolean,
            Element::Numerical(_) => ElementKind::Numerical,
        }
    }

    pub fn index(self) -> u32 {
        match self {
            Element::Concept(c) => c.index(),
            Element::Role(r) => r.index(),
            Element::Boolean(b) => b.index(),
            Element::Numerical(n) => n.index(),
        }
    }

    pub fn as_concept(self) -> Option<Concept> {
        match self {
            Element::Concept(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_role(self) -> Option<Role> {
        match self {
            Element::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_boolean(self) -> Option<Boolean> {
        match self {
            Element::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_numerical(self) -> Option<Numerical> {
        match self {
            Element::Numerical(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Concept> for Element {
    fn from(c: Concept) -> Self {
        Element::Concept(c)
    }
}

impl From<Role> for Element {
    fn from(r: Role) -> Self {
        Element::Role(r)
    }
}

impl From<Boolean> for Element {
    fn from(b: Boolean) -> Self {
        Element::Boolean(b)
    }
}

impl From<Numerical> for Element {
    fn from(n: Numerical) -> Self {
        Element::Numerical(n)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Concept(c) => write!(f, "{}", c),
            Element::Role(r) => write!(f, "{}", r),
            Element::Boolean(b) => write!(f, "{}", b),
            Element::Numerical(n) => write!(f, "{}", n),
        }
    }
}
