//! Parser for the canonical textual form of expressions.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char as nomchar, multispace0},
    combinator::{all_consuming, opt},
    error::{convert_error, ParseError, VerboseError},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
    Finish,
};

use crate::error::ConstructionError;
use crate::factory::ElementFactory;
use crate::reference::{Boolean, Concept, Element, ElementKind, Numerical, Role};
use crate::rules::Rule;

type IResult<'a, O, E = VerboseError<&'a str>> = Result<(&'a str, O), nom::Err<E>>;

/// A parsed but not yet interpreted term: `name` or `name(arg,...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term<'a> {
    pub name: &'a str,
    pub args: Vec<Term<'a>>,
}

fn wsl<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<'a, O, E>
where
    E: ParseError<&'a str>,
    F: FnMut(&'a str) -> IResult<'a, O, E>,
{
    preceded(multispace0, inner)
}

fn ident(s: &str) -> IResult<'_, &str> {
    wsl(take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'))(s)
}

fn term(s: &str) -> IResult<'_, Term<'_>> {
    let (s, name) = ident(s)?;
    let arguments = delimited(
        wsl(nomchar('(')),
        separated_list0(wsl(nomchar(',')), term),
        wsl(nomchar(')')),
    );
    let (s, args) = opt(arguments)(s)?;
    Ok((
        s,
        Term {
            name,
            args: args.unwrap_or_default(),
        },
    ))
}

/// Parse a whole string into a term.
pub fn parse_term(input: &str) -> Result<Term<'_>, ConstructionError> {
    all_consuming(terminated(term, multispace0))(input)
        .finish()
        .map(|(_, t)| t)
        .map_err(|e| ConstructionError::Parse {
            input: input.to_string(),
            message: convert_error(input, e),
        })
}

/// The name of an argument-less term.
fn symbol<'t>(t: &Term<'t>) -> Option<&'t str> {
    t.args.is_empty().then_some(t.name)
}

impl ElementFactory {
    /// Build an expression from its canonical textual form.
    pub fn parse(&self, text: &str) -> Result<Element, ConstructionError> {
        let term = parse_term(text)?;
        self.build(text, &term)
    }

    pub fn parse_concept(&self, text: &str) -> Result<Concept, ConstructionError> {
        let e = self.parse(text)?;
        e.as_concept().ok_or_else(|| self.wrong_kind(e, ElementKind::Concept))
    }

    pub fn parse_role(&self, text: &str) -> Result<Role, ConstructionError> {
        let e = self.parse(text)?;
        e.as_role().ok_or_else(|| self.wrong_kind(e, ElementKind::Role))
    }

    pub fn parse_boolean(&self, text: &str) -> Result<Boolean, ConstructionError> {
        let e = self.parse(text)?;
        e.as_boolean().ok_or_else(|| self.wrong_kind(e, ElementKind::Boolean))
    }

    pub fn parse_numerical(&self, text: &str) -> Result<Numerical, ConstructionError> {
        let e = self.parse(text)?;
        e.as_numerical().ok_or_else(|| self.wrong_kind(e, ElementKind::Numerical))
    }

    fn wrong_kind(&self, e: Element, expected: ElementKind) -> ConstructionError {
        ConstructionError::TypeMismatch {
            rule: self.node(e).rule().name(),
            expected: match expected {
                ElementKind::Concept => "to denote a concept",
                ElementKind::Role => "to denote a role",
                ElementKind::Boolean => "to denote a boolean",
                ElementKind::Numerical => "to denote a numerical",
            },
            found: e.kind().to_string(),
        }
    }

    fn build(&self, input: &str, term: &Term<'_>) -> Result<Element, ConstructionError> {
        let parse_error = |message: String| ConstructionError::Parse {
            input: input.to_string(),
            message,
        };
        let rule = Rule::from_name(term.name)
            .ok_or_else(|| parse_error(format!("unknown rule `{}`", term.name)))?;
        let arity_error = || parse_error(format!("`{}` expects {}", rule, rule.signature()));

        let position = |t: &Term<'_>| -> Result<u32, ConstructionError> {
            symbol(t)
                .ok_or_else(|| arity_error())?
                .parse::<u32>()
                .map_err(|_| parse_error(format!("`{}` is not a position", t.name)))
        };
        let predicate = |t: &Term<'_>| {
            let name = symbol(t).ok_or_else(|| arity_error())?;
            self.vocabulary()
                .find_predicate(name)
                .ok_or_else(|| ConstructionError::UnknownPredicate {
                    name: name.to_string(),
                })
        };

        match (rule, term.args.as_slice()) {
            (Rule::PrimitiveConcept, [p, pos]) => self
                .mk_primitive_concept(predicate(p)?, position(pos)?)
                .map(Element::from),
            (Rule::PrimitiveRole, [p, pos1, pos2]) => self
                .mk_primitive_role(predicate(p)?, position(pos1)?, position(pos2)?)
                .map(Element::from),
            (Rule::NullaryBoolean, [p]) => self.mk_nullary_boolean(predicate(p)?).map(Element::from),
            (Rule::OneOfConcept, [k]) => {
                let name = symbol(k).ok_or_else(|| arity_error())?;
                let constant = self.vocabulary().find_constant(name).ok_or_else(|| {
                    ConstructionError::UnknownConstant {
                        name: name.to_string(),
                    }
                })?;
                self.mk_one_of_concept(constant).map(Element::from)
            }
            (Rule::ProjectionConcept, [r, pos]) => {
                let r = self.build(input, r)?;
                let r = r.as_role().ok_or_else(|| ConstructionError::TypeMismatch {
                    rule: rule.name(),
                    expected: rule.signature(),
                    found: r.kind().to_string(),
                })?;
                self.mk_projection_concept(r, position(pos)?).map(Element::from)
            }
            (Rule::BotConcept, []) => Ok(self.mk_bot_concept().into()),
            (Rule::TopConcept, []) => Ok(self.mk_top_concept().into()),
            (Rule::TopRole, []) => Ok(self.mk_top_role().into()),
            (rule, args) if !rule.takes_symbols() => {
                let children = args
                    .iter()
                    .map(|t| self.build(input, t))
                    .collect::<Result<Vec<_>, _>>()?;
                self.make_composite(rule, &children)
            }
            _ => Err(arity_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::vocabulary::Vocabulary;

    use super::*;

    fn factory() -> ElementFactory {
        let mut vocabulary = Vocabulary::new();
        vocabulary.add_predicate("on", 2).unwrap();
        vocabulary.add_predicate("clear", 1).unwrap();
        vocabulary.add_predicate("arm-empty", 0).unwrap();
        vocabulary.add_constant("table");
        ElementFactory::new(Arc::new(vocabulary))
    }

    #[test]
    fn test_parse_term() {
        let t = parse_term(" c_and( c_top , c_bot )").unwrap();
        assert_eq!(t.name, "c_and");
        assert_eq!(t.args.len(), 2);
        assert_eq!(t.args[0].name, "c_top");
        assert!(t.args[1].args.is_empty());
        assert!(parse_term("c_and(c_top,").is_err());
        assert!(parse_term("c_and(c_top) junk").is_err());
    }

    #[test]
    fn test_parse_reprs() {
        let factory = factory();
        for text in [
            "c_top",
            "c_primitive(clear,0)",
            "r_primitive(on,0,1)",
            "b_nullary(arm-empty)",
            "c_one_of(table)",
            "c_projection(r_primitive(on,0,1),1)",
            "c_some(r_primitive(on,0,1),c_primitive(clear,0))",
            "b_inclusion(r_top,r_inverse(r_primitive(on,0,1)))",
            "n_concept_distance(c_primitive(clear,0),r_primitive(on,0,1),c_bot)",
            "n_count(r_transitive_closure(r_primitive(on,0,1)))",
        ] {
            let e = factory.parse(text).unwrap();
            assert_eq!(factory.repr(e), text);
        }
    }

    #[test]
    fn test_parse_shares_nodes() {
        let factory = factory();
        let a = factory.parse_concept("c_and(c_primitive(clear,0),c_top)").unwrap();
        let b = factory.parse_concept("c_and(c_top,c_primitive(clear,0))").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_errors() {
        let factory = factory();
        assert!(matches!(
            factory.parse("c_primitive(holding,0)"),
            Err(ConstructionError::UnknownPredicate { .. })
        ));
        assert!(matches!(
            factory.parse("c_one_of(floor)"),
            Err(ConstructionError::UnknownConstant { .. })
        ));
        assert!(matches!(factory.parse("c_frobnicate"), Err(ConstructionError::Parse { .. })));
        assert!(matches!(factory.parse("c_primitive(clear)"), Err(ConstructionError::Parse { .. })));
        assert!(matches!(
            factory.parse("c_not(r_top)"),
            Err(ConstructionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            factory.parse("c_primitive(on,0)").map(|e| e.kind()),
            Ok(ElementKind::Concept)
        ));
        assert!(matches!(
            factory.parse_role("c_top"),
            Err(ConstructionError::TypeMismatch { .. })
        ));
    }
}
