//! Canonical textual form of expressions.
//!
//! The form is the rule name followed by its arguments in parentheses, with
//! no whitespace: `c_some(r_primitive(on,0,1),c_primitive(clear,0))`.
//! Argument-less rules are written bare (`c_top`).

use std::fmt::{self, Write};

use crate::factory::ElementFactory;
use crate::node::Node;
use crate::reference::Element;

impl ElementFactory {
    /// Render an expression in canonical textual form.
    pub fn repr(&self, element: impl Into<Element>) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_repr(&mut s, element.into());
        s
    }

    fn write_repr(&self, out: &mut impl Write, element: Element) -> fmt::Result {
        let node = self.node(element);
        let rule = node.rule().name();
        let vocabulary = self.vocabulary();
        match node {
            Node::PrimitiveConcept { predicate, pos } => {
                write!(out, "{}({},{})", rule, vocabulary.predicate(predicate).name(), pos)
            }
            Node::PrimitiveRole { predicate, pos1, pos2 } => write!(
                out,
                "{}({},{},{})",
                rule,
                vocabulary.predicate(predicate).name(),
                pos1,
                pos2
            ),
            Node::NullaryBoolean(predicate) => {
                write!(out, "{}({})", rule, vocabulary.predicate(predicate).name())
            }
            Node::OneOfConcept(constant) => {
                write!(out, "{}({})", rule, vocabulary.constant(constant).name())
            }
            Node::ProjectionConcept(r, pos) => {
                write!(out, "{}(", rule)?;
                self.write_repr(out, r.into())?;
                write!(out, ",{})", pos)
            }
            _ => {
                let children = node.children();
                if children.is_empty() {
                    return out.write_str(rule);
                }
                write!(out, "{}(", rule)?;
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    self.write_repr(out, child)?;
                }
                out.write_char(')')
            }
        }
    }
}
