//! Per-rule counters of a generation run.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use log::debug;

use crate::reducer::Registration;
use crate::rules::Rule;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RuleStatistics {
    /// Candidates built by the rule.
    pub candidates: usize,
    /// Candidates kept as representatives of a new denotation vector.
    pub kept: usize,
    /// Candidates whose denotation vector already had a representative.
    pub duplicates: usize,
    /// Candidates that were already considered earlier in the run.
    pub known: usize,
}

impl RuleStatistics {
    pub(crate) fn record(&mut self, registration: Registration) {
        match registration {
            Registration::Kept => self.kept += 1,
            Registration::Duplicate(_) => self.duplicates += 1,
            Registration::Known => self.known += 1,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeneratorStatistics {
    pub rules: BTreeMap<Rule, RuleStatistics>,
    /// Number of completed complexity layers.
    pub layers: u32,
    pub elapsed: Duration,
    /// Denotation vectors computed over the sample.
    pub evaluations: usize,
    /// Denotation vectors held by the evaluator cache at the end of the run.
    pub cached_vectors: usize,
    /// Size of the factory at the end of the run.
    pub factory_size: usize,
}

impl GeneratorStatistics {
    pub(crate) fn rule_mut(&mut self, rule: Rule) -> &mut RuleStatistics {
        self.rules.entry(rule).or_default()
    }

    pub fn rule(&self, rule: Rule) -> RuleStatistics {
        self.rules.get(&rule).copied().unwrap_or_default()
    }

    pub fn total(&self) -> RuleStatistics {
        self.rules.values().fold(RuleStatistics::default(), |acc, s| RuleStatistics {
            candidates: acc.candidates + s.candidates,
            kept: acc.kept + s.kept,
            duplicates: acc.duplicates + s.duplicates,
            known: acc.known + s.known,
        })
    }

    pub fn log(&self) {
        for line in self.to_string().lines() {
            debug!("{}", line);
        }
    }
}

impl fmt::Display for GeneratorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<32} {:>10} {:>10} {:>10} {:>10}",
            "rule", "candidates", "kept", "duplicates", "known"
        )?;
        for (rule, s) in &self.rules {
            writeln!(
                f,
                "{:<32} {:>10} {:>10} {:>10} {:>10}",
                rule.name(),
                s.candidates,
                s.kept,
                s.duplicates,
                s.known
            )?;
        }
        let total = self.total();
        writeln!(
            f,
            "{:<32} {:>10} {:>10} {:>10} {:>10}",
            "total", total.candidates, total.kept, total.duplicates, total.known
        )?;
        write!(
            f,
            "layers: {}, elapsed: {:.3?}, evaluations: {}, cached vectors: {}, factory size: {}",
            self.layers, self.elapsed, self.evaluations, self.cached_vectors, self.factory_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Concept, Element};

    #[test]
    fn test_record_and_total() {
        let mut stats = GeneratorStatistics::default();
        let s = stats.rule_mut(Rule::NotConcept);
        s.candidates += 3;
        s.record(Registration::Kept);
        s.record(Registration::Duplicate(Element::Concept(Concept::new(1))));
        s.record(Registration::Known);
        stats.rule_mut(Rule::TopRole).candidates += 1;
        stats.rule_mut(Rule::TopRole).record(Registration::Kept);

        assert_eq!(stats.rule(Rule::NotConcept).kept, 1);
        assert_eq!(stats.rule(Rule::OrRole), RuleStatistics::default());
        let total = stats.total();
        assert_eq!(total.candidates, 4);
        assert_eq!(total.kept, 2);
        assert_eq!(total.duplicates, 1);
        assert_eq!(total.known, 1);

        let text = stats.to_string();
        assert!(text.contains("c_not"));
        assert!(text.contains("r_top"));
    }
}
