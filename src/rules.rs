//! Production rules of the description-logic grammar and their toggles.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::reference::ElementKind;

/// A production rule.
///
/// The declaration order is the enumeration order of the generator: concept
/// rules first, then roles, booleans and numericals.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "c_primitive")]
    PrimitiveConcept,
    #[serde(rename = "c_bot")]
    BotConcept,
    #[serde(rename = "c_top")]
    TopConcept,
    #[serde(rename = "c_one_of")]
    OneOfConcept,
    #[serde(rename = "c_not")]
    NotConcept,
    #[serde(rename = "c_and")]
    AndConcept,
    #[serde(rename = "c_or")]
    OrConcept,
    #[serde(rename = "c_diff")]
    DiffConcept,
    #[serde(rename = "c_projection")]
    ProjectionConcept,
    #[serde(rename = "c_some")]
    SomeConcept,
    #[serde(rename = "c_all")]
    AllConcept,
    #[serde(rename = "c_equal")]
    EqualConcept,
    #[serde(rename = "c_subset")]
    SubsetConcept,

    #[serde(rename = "r_primitive")]
    PrimitiveRole,
    #[serde(rename = "r_top")]
    TopRole,
    #[serde(rename = "r_inverse")]
    InverseRole,
    #[serde(rename = "r_not")]
    NotRole,
    #[serde(rename = "r_and")]
    AndRole,
    #[serde(rename = "r_or")]
    OrRole,
    #[serde(rename = "r_diff")]
    DiffRole,
    #[serde(rename = "r_compose")]
    ComposeRole,
    #[serde(rename = "r_identity")]
    IdentityRole,
    #[serde(rename = "r_restrict")]
    RestrictRole,
    #[serde(rename = "r_transitive_closure")]
    TransitiveClosureRole,
    #[serde(rename = "r_transitive_reflexive_closure")]
    TransitiveReflexiveClosureRole,
    #[serde(rename = "r_til_c")]
    TilCRole,

    #[serde(rename = "b_nullary")]
    NullaryBoolean,
    #[serde(rename = "b_empty")]
    EmptyBoolean,
    #[serde(rename = "b_inclusion")]
    InclusionBoolean,

    #[serde(rename = "n_count")]
    CountNumerical,
    #[serde(rename = "n_concept_distance")]
    ConceptDistanceNumerical,
}

impl Rule {
    /// Every rule, in enumeration order.
    pub const ALL: [Rule; 31] = [
        Rule::PrimitiveConcept,
        Rule::BotConcept,
        Rule::TopConcept,
        Rule::OneOfConcept,
        Rule::NotConcept,
        Rule::AndConcept,
        Rule::OrConcept,
        Rule::DiffConcept,
        Rule::ProjectionConcept,
        Rule::SomeConcept,
        Rule::AllConcept,
        Rule::EqualConcept,
        Rule::SubsetConcept,
        Rule::PrimitiveRole,
        Rule::TopRole,
        Rule::InverseRole,
        Rule::NotRole,
        Rule::AndRole,
        Rule::OrRole,
        Rule::DiffRole,
        Rule::ComposeRole,
        Rule::IdentityRole,
        Rule::RestrictRole,
        Rule::TransitiveClosureRole,
        Rule::TransitiveReflexiveClosureRole,
        Rule::TilCRole,
        Rule::NullaryBoolean,
        Rule::EmptyBoolean,
        Rule::InclusionBoolean,
        Rule::CountNumerical,
        Rule::ConceptDistanceNumerical,
    ];

    /// Canonical name, as used in the textual form of expressions.
    pub const fn name(self) -> &'static str {
        match self {
            Rule::PrimitiveConcept => "c_primitive",
            Rule::BotConcept => "c_bot",
            Rule::TopConcept => "c_top",
            Rule::OneOfConcept => "c_one_of",
            Rule::NotConcept => "c_not",
            Rule::AndConcept => "c_and",
            Rule::OrConcept => "c_or",
            Rule::DiffConcept => "c_diff",
            Rule::ProjectionConcept => "c_projection",
            Rule::SomeConcept => "c_some",
            Rule::AllConcept => "c_all",
            Rule::EqualConcept => "c_equal",
            Rule::SubsetConcept => "c_subset",
            Rule::PrimitiveRole => "r_primitive",
            Rule::TopRole => "r_top",
            Rule::InverseRole => "r_inverse",
            Rule::NotRole => "r_not",
            Rule::AndRole => "r_and",
            Rule::OrRole => "r_or",
            Rule::DiffRole => "r_diff",
            Rule::ComposeRole => "r_compose",
            Rule::IdentityRole => "r_identity",
            Rule::RestrictRole => "r_restrict",
            Rule::TransitiveClosureRole => "r_transitive_closure",
            Rule::TransitiveReflexiveClosureRole => "r_transitive_reflexive_closure",
            Rule::TilCRole => "r_til_c",
            Rule::NullaryBoolean => "b_nullary",
            Rule::EmptyBoolean => "b_empty",
            Rule::InclusionBoolean => "b_inclusion",
            Rule::CountNumerical => "n_count",
            Rule::ConceptDistanceNumerical => "n_concept_distance",
        }
    }

    pub fn from_name(name: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|rule| rule.name() == name)
    }

    /// The kind of expression the rule produces.
    pub fn kind(self) -> ElementKind {
        match self.name().as_bytes()[0] {
            b'c' => ElementKind::Concept,
            b'r' => ElementKind::Role,
            b'b' => ElementKind::Boolean,
            b'n' => ElementKind::Numerical,
            _ => unreachable!(),
        }
    }

    /// Whether the rule takes symbols (predicates, constants, positions),
    /// so it cannot be built from sub-expressions alone.
    pub fn takes_symbols(self) -> bool {
        matches!(
            self,
            Rule::PrimitiveConcept
                | Rule::BotConcept
                | Rule::TopConcept
                | Rule::OneOfConcept
                | Rule::ProjectionConcept
                | Rule::PrimitiveRole
                | Rule::TopRole
                | Rule::NullaryBoolean
        )
    }

    /// Whether the operand order does not matter.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            Rule::AndConcept | Rule::OrConcept | Rule::EqualConcept | Rule::AndRole | Rule::OrRole
        )
    }

    /// Human-readable operand signature, used in error messages.
    pub fn signature(self) -> &'static str {
        match self {
            Rule::PrimitiveConcept => "(predicate, position)",
            Rule::PrimitiveRole => "(predicate, position, position)",
            Rule::NullaryBoolean => "(predicate)",
            Rule::OneOfConcept => "(constant)",
            Rule::ProjectionConcept => "(role, position)",
            Rule::BotConcept | Rule::TopConcept | Rule::TopRole => "()",
            Rule::NotConcept | Rule::IdentityRole => "(concept)",
            Rule::AndConcept | Rule::OrConcept | Rule::DiffConcept => "(concept, concept)",
            Rule::SomeConcept | Rule::AllConcept | Rule::RestrictRole | Rule::TilCRole => {
                "(role, concept)"
            }
            Rule::EqualConcept
            | Rule::SubsetConcept
            | Rule::AndRole
            | Rule::OrRole
            | Rule::DiffRole
            | Rule::ComposeRole => "(role, role)",
            Rule::InverseRole
            | Rule::NotRole
            | Rule::TransitiveClosureRole
            | Rule::TransitiveReflexiveClosureRole => "(role)",
            Rule::EmptyBoolean | Rule::CountNumerical => "(concept) or (role)",
            Rule::InclusionBoolean => "(concept, concept) or (role, role)",
            Rule::ConceptDistanceNumerical => "(concept, role, concept)",
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of enabled production rules. Every rule is enabled by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    disabled: BTreeSet<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        !self.disabled.contains(&rule)
    }

    pub fn set_enabled(&mut self, rule: Rule, enabled: bool) -> &mut Self {
        if enabled {
            self.disabled.remove(&rule);
        } else {
            self.disabled.insert(rule);
        }
        self
    }

    /// Enabled rules, in enumeration order.
    pub fn enabled(&self) -> impl Iterator<Item = Rule> + '_ {
        Rule::ALL.into_iter().filter(|&rule| self.is_enabled(rule))
    }

    /// Disabled rules, in enumeration order.
    pub fn disabled(&self) -> impl Iterator<Item = Rule> + '_ {
        self.disabled.iter().copied()
    }

    pub fn set_generate_inclusion_boolean(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::InclusionBoolean, enabled)
    }

    pub fn set_generate_diff_concept(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::DiffConcept, enabled)
    }

    pub fn set_generate_or_concept(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::OrConcept, enabled)
    }

    pub fn set_generate_subset_concept(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::SubsetConcept, enabled)
    }

    pub fn set_generate_and_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::AndRole, enabled)
    }

    pub fn set_generate_compose_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::ComposeRole, enabled)
    }

    pub fn set_generate_diff_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::DiffRole, enabled)
    }

    pub fn set_generate_identity_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::IdentityRole, enabled)
    }

    pub fn set_generate_not_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::NotRole, enabled)
    }

    pub fn set_generate_or_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::OrRole, enabled)
    }

    pub fn set_generate_top_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::TopRole, enabled)
    }

    pub fn set_generate_transitive_reflexive_closure_role(&mut self, enabled: bool) -> &mut Self {
        self.set_enabled(Rule::TransitiveReflexiveClosureRole, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for rule in Rule::ALL {
            assert_eq!(Rule::from_name(rule.name()), Some(rule));
        }
        assert_eq!(Rule::from_name("c_nope"), None);
        assert_eq!(Rule::from_name("r_til_c"), Some(Rule::TilCRole));
        assert_eq!(Rule::TilCRole.kind(), ElementKind::Role);
    }

    #[test]
    fn test_order_follows_kinds() {
        let kinds: Vec<ElementKind> = Rule::ALL.iter().map(|r| r.kind()).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert!(Rule::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rule_set() {
        let mut rules = RuleSet::new();
        assert!(Rule::ALL.iter().all(|&r| rules.is_enabled(r)));
        rules.set_generate_or_role(false).set_generate_diff_concept(false);
        assert!(!rules.is_enabled(Rule::OrRole));
        assert!(!rules.is_enabled(Rule::DiffConcept));
        assert_eq!(rules.enabled().count(), 29);
        assert_eq!(rules.disabled().collect::<Vec<_>>(), vec![Rule::DiffConcept, Rule::OrRole]);
        rules.set_enabled(Rule::OrRole, true);
        assert!(rules.is_enabled(Rule::OrRole));
    }
}
