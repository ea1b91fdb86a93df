//! Layered feature generation.
//!
//! Expressions are enumerated by increasing complexity. Layer `k` applies
//! every enabled rule, in the fixed [`Rule::ALL`] order, to kept concepts and
//! roles of lower layers whose complexities sum to `k - 1`. Each candidate is
//! evaluated over the state sample and kept only if no earlier expression of
//! the same kind has the same denotation vector. Kept booleans and numericals
//! are the output features; kept concepts and roles feed the next layers.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, log_enabled, Level};
use rayon::prelude::*;

use crate::config::GeneratorConfig;
use crate::error::ConfigError;
use crate::factory::ElementFactory;
use crate::feature::Feature;
use crate::node::Node;
use crate::reducer::{EquivalenceReducer, Registration};
use crate::reference::{Concept, Element, ElementKind, Role};
use crate::rules::{Rule, RuleSet};
use crate::state::State;
use crate::stats::GeneratorStatistics;
use crate::vocabulary::Vocabulary;

/// How a generation run ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GenerationStatus {
    /// Every layer up to the largest complexity limit was enumerated.
    Completed,
    /// The time budget ran out; the features found so far are returned.
    TimeLimitReached,
    /// The feature budget was reached.
    FeatureLimitReached,
}

/// Result of [`FeatureGenerator::run`].
#[derive(Debug, Clone)]
pub struct Generation {
    pub features: Vec<Feature>,
    pub status: GenerationStatus,
    pub statistics: GeneratorStatistics,
}

/// Generator of description-logic features.
#[derive(Debug, Clone, Default)]
pub struct FeatureGenerator {
    config: GeneratorConfig,
}

impl FeatureGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GeneratorConfig {
        &mut self.config
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.config.rules
    }

    /// Generate features with the given limits and this generator's rules.
    ///
    /// Returns the features in generation order. Running out of time or
    /// feature budget is not an error; use [`run`](Self::run) to observe it.
    #[allow(clippy::too_many_arguments)]
    pub fn generate(
        &self,
        factory: &ElementFactory,
        states: &[State],
        concept_complexity_limit: u32,
        role_complexity_limit: u32,
        boolean_complexity_limit: u32,
        count_numerical_complexity_limit: u32,
        distance_numerical_complexity_limit: u32,
        time_limit_secs: f64,
        feature_limit: usize,
    ) -> Result<Vec<Feature>, ConfigError> {
        let config = self
            .config
            .clone()
            .with_limits(
                concept_complexity_limit,
                role_complexity_limit,
                boolean_complexity_limit,
                count_numerical_complexity_limit,
                distance_numerical_complexity_limit,
            )
            .with_time_limit_secs(time_limit_secs)
            .with_feature_limit(feature_limit);
        let generation = Self::with_config(config).run(factory, states)?;
        Ok(generation.features)
    }

    /// Generate features with the limits of this generator's configuration.
    pub fn run(&self, factory: &ElementFactory, states: &[State]) -> Result<Generation, ConfigError> {
        let start = Instant::now();
        self.config.validate()?;
        validate_states(factory.vocabulary(), states)?;

        info!(
            "generating features over {} states, complexity limits {}/{}/{}/{}/{}",
            states.len(),
            self.config.concept_complexity_limit,
            self.config.role_complexity_limit,
            self.config.boolean_complexity_limit,
            self.config.count_numerical_complexity_limit,
            self.config.distance_numerical_complexity_limit
        );

        let mut session = Session::new(factory, &self.config, states, start);
        let status = session.enumerate();
        Ok(session.finish(status))
    }
}

fn validate_states(vocabulary: &Arc<Vocabulary>, states: &[State]) -> Result<(), ConfigError> {
    if states.is_empty() {
        return Err(ConfigError::EmptySample);
    }
    for (i, state) in states.iter().enumerate() {
        let other = state.instance().vocabulary();
        if !Arc::ptr_eq(other, vocabulary) && other.as_ref() != vocabulary.as_ref() {
            return Err(ConfigError::VocabularyMismatch { state: i });
        }
    }
    Ok(())
}

/// Kept concepts and roles of the completed layers, indexed by complexity.
struct Frontier {
    concepts: Vec<Vec<Concept>>,
    roles: Vec<Vec<Role>>,
}

/// Concepts and roles kept in the layer being enumerated.
#[derive(Default)]
struct Layer {
    concepts: Vec<Concept>,
    roles: Vec<Role>,
}

impl Layer {
    fn push(&mut self, element: Element) {
        match element {
            Element::Concept(c) => self.concepts.push(c),
            Element::Role(r) => self.roles.push(r),
            _ => {}
        }
    }
}

impl Frontier {
    /// Empty frontier; layer 0 never holds anything.
    fn new() -> Self {
        Self {
            concepts: vec![Vec::new()],
            roles: vec![Vec::new()],
        }
    }

    /// Append the next completed layer.
    fn close(&mut self, layer: Layer) {
        self.concepts.push(layer.concepts);
        self.roles.push(layer.roles);
    }

    /// Candidates of `rule` with complexity `k`, in enumeration order.
    ///
    /// Layers `1..k` must be closed. Candidates are produced on demand.
    fn candidates<'a>(&'a self, rule: Rule, k: u32, vocabulary: &Vocabulary) -> Box<dyn Iterator<Item = Node> + 'a> {
        if k == 1 {
            return Box::new(primitives(rule, vocabulary).into_iter());
        }

        let c = &self.concepts[..k as usize];
        let r = &self.roles[..k as usize];
        let c1 = c[k as usize - 1].iter().copied();
        let r1 = r[k as usize - 1].iter().copied();
        match rule {
            Rule::PrimitiveConcept
            | Rule::BotConcept
            | Rule::TopConcept
            | Rule::OneOfConcept
            | Rule::PrimitiveRole
            | Rule::TopRole
            | Rule::NullaryBoolean => Box::new(std::iter::empty()),

            Rule::NotConcept => Box::new(c1.map(Node::NotConcept)),
            Rule::AndConcept => Box::new(symmetric(k, c, Node::AndConcept)),
            Rule::OrConcept => Box::new(symmetric(k, c, Node::OrConcept)),
            Rule::DiffConcept => Box::new(product(k, c, c, |a, b| (a != b).then_some(Node::DiffConcept(a, b)))),
            Rule::ProjectionConcept => {
                Box::new(r1.flat_map(|x| [Node::ProjectionConcept(x, 0), Node::ProjectionConcept(x, 1)]))
            }
            Rule::SomeConcept => Box::new(product(k, r, c, |a, b| Some(Node::SomeConcept(a, b)))),
            Rule::AllConcept => Box::new(product(k, r, c, |a, b| Some(Node::AllConcept(a, b)))),
            Rule::EqualConcept => Box::new(symmetric(k, r, Node::EqualConcept)),
            Rule::SubsetConcept => Box::new(product(k, r, r, |a, b| (a != b).then_some(Node::SubsetConcept(a, b)))),

            Rule::InverseRole => Box::new(r1.map(Node::InverseRole)),
            Rule::NotRole => Box::new(r1.map(Node::NotRole)),
            Rule::AndRole => Box::new(symmetric(k, r, Node::AndRole)),
            Rule::OrRole => Box::new(symmetric(k, r, Node::OrRole)),
            Rule::DiffRole => Box::new(product(k, r, r, |a, b| (a != b).then_some(Node::DiffRole(a, b)))),
            Rule::ComposeRole => Box::new(product(k, r, r, |a, b| Some(Node::ComposeRole(a, b)))),
            Rule::IdentityRole => Box::new(c1.map(Node::IdentityRole)),
            Rule::RestrictRole => Box::new(product(k, r, c, |a, b| Some(Node::RestrictRole(a, b)))),
            Rule::TransitiveClosureRole => Box::new(r1.map(Node::TransitiveClosureRole)),
            Rule::TransitiveReflexiveClosureRole => Box::new(r1.map(Node::TransitiveReflexiveClosureRole)),
            Rule::TilCRole => Box::new(product(k, r, c, |a, b| Some(Node::TilCRole(a, b)))),

            Rule::EmptyBoolean => Box::new(
                c1.map(Node::EmptyConceptBoolean)
                    .chain(r1.map(Node::EmptyRoleBoolean)),
            ),
            Rule::InclusionBoolean => Box::new(
                product(k, c, c, |a, b| (a != b).then_some(Node::InclusionConceptBoolean(a, b)))
                    .chain(product(k, r, r, |a, b| (a != b).then_some(Node::InclusionRoleBoolean(a, b)))),
            ),

            Rule::CountNumerical => Box::new(
                c1.map(Node::CountConceptNumerical)
                    .chain(r1.map(Node::CountRoleNumerical)),
            ),
            Rule::ConceptDistanceNumerical => Box::new(distances(k, c, r)),
        }
    }
}

/// Complexity-one expressions built directly from the vocabulary.
fn primitives(rule: Rule, vocabulary: &Vocabulary) -> Vec<Node> {
    let mut out = Vec::new();
    match rule {
        Rule::PrimitiveConcept => {
            for p in vocabulary.predicates() {
                for pos in 0..p.arity() as u32 {
                    out.push(Node::PrimitiveConcept {
                        predicate: p.index(),
                        pos,
                    });
                }
            }
        }
        Rule::BotConcept => out.push(Node::BotConcept),
        Rule::TopConcept => out.push(Node::TopConcept),
        Rule::OneOfConcept => {
            out.extend(vocabulary.constants().iter().map(|k| Node::OneOfConcept(k.index())))
        }
        Rule::PrimitiveRole => {
            for p in vocabulary.predicates() {
                let arity = p.arity() as u32;
                for pos1 in 0..arity {
                    for pos2 in pos1 + 1..arity {
                        out.push(Node::PrimitiveRole {
                            predicate: p.index(),
                            pos1,
                            pos2,
                        });
                    }
                }
            }
        }
        Rule::TopRole => out.push(Node::TopRole),
        Rule::NullaryBoolean => {
            for p in vocabulary.predicates().iter().filter(|p| p.arity() == 0) {
                out.push(Node::NullaryBoolean(p.index()));
            }
        }
        _ => {}
    }
    out
}

/// Ordered operand pairs with complexities `i + j == k - 1`, lower `i` first.
fn product<'a, A: Copy + 'a, B: Copy + 'a>(
    k: u32,
    left: &'a [Vec<A>],
    right: &'a [Vec<B>],
    make: impl Fn(A, B) -> Option<Node> + Copy + 'a,
) -> impl Iterator<Item = Node> + 'a {
    let total = k - 1;
    (1..total).flat_map(move |i| {
        let right = &right[(total - i) as usize];
        left[i as usize]
            .iter()
            .flat_map(move |&a| right.iter().filter_map(move |&b| make(a, b)))
    })
}

/// Unordered pairs of distinct operands with complexities `i + j == k - 1`.
fn symmetric<'a, A: Copy + 'a>(
    k: u32,
    layers: &'a [Vec<A>],
    make: impl Fn(A, A) -> Node + Copy + 'a,
) -> impl Iterator<Item = Node> + 'a {
    let total = k - 1;
    (1..total).take_while(move |&i| i <= total - i).flat_map(move |i| {
        let left = &layers[i as usize];
        let right = &layers[(total - i) as usize];
        left.iter().enumerate().flat_map(move |(x, &a)| {
            let rest = if 2 * i < total { &right[..] } else { &left[x + 1..] };
            rest.iter().map(move |&b| make(a, b))
        })
    })
}

/// Distance triples with complexities `i + j + l == k - 1`.
fn distances<'a>(k: u32, c: &'a [Vec<Concept>], r: &'a [Vec<Role>]) -> impl Iterator<Item = Node> + 'a {
    let total = k - 1;
    (1..total)
        .flat_map(move |i| (1..total - i).map(move |j| (i, j)))
        .flat_map(move |(i, j)| {
            let roles = &r[j as usize];
            let targets = &c[(total - i - j) as usize];
            c[i as usize].iter().flat_map(move |&from| {
                roles.iter().flat_map(move |&role| {
                    targets
                        .iter()
                        .map(move |&to| Node::ConceptDistanceNumerical(from, role, to))
                })
            })
        })
}

/// State of one generation run.
struct Session<'a, 's> {
    factory: &'a ElementFactory,
    config: &'a GeneratorConfig,
    reducer: EquivalenceReducer<'s>,
    layer: Layer,
    features: Vec<Feature>,
    statistics: GeneratorStatistics,
    start: Instant,
    deadline: Option<Instant>,
}

impl<'a, 's> Session<'a, 's> {
    fn new(factory: &'a ElementFactory, config: &'a GeneratorConfig, states: &'s [State], start: Instant) -> Self {
        Self {
            factory,
            config,
            reducer: EquivalenceReducer::new(states),
            layer: Layer::default(),
            features: Vec::new(),
            statistics: GeneratorStatistics::default(),
            start,
            deadline: start.checked_add(config.time_limit()),
        }
    }

    fn limit(&self, rule: Rule) -> u32 {
        match rule.kind() {
            ElementKind::Concept => self.config.concept_complexity_limit,
            ElementKind::Role => self.config.role_complexity_limit,
            ElementKind::Boolean => self.config.boolean_complexity_limit,
            ElementKind::Numerical if rule == Rule::CountNumerical => {
                self.config.count_numerical_complexity_limit
            }
            ElementKind::Numerical => self.config.distance_numerical_complexity_limit,
        }
    }

    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn enumerate(&mut self) -> GenerationStatus {
        let config = self.config;
        let vocabulary = Arc::clone(self.factory.vocabulary());
        let mut frontier = Frontier::new();
        for k in 1..=config.max_complexity() {
            for rule in config.rules.enabled() {
                if k > self.limit(rule) {
                    continue;
                }
                let candidates = frontier.candidates(rule, k, &vocabulary);
                if let ControlFlow::Break(status) = self.process(rule, k, candidates) {
                    return status;
                }
            }
            let layer = std::mem::take(&mut self.layer);
            self.statistics.layers = k;
            info!(
                "layer {}: {} concepts, {} roles, {} features in {:.3?}",
                k,
                layer.concepts.len(),
                layer.roles.len(),
                self.features.len(),
                self.start.elapsed()
            );
            frontier.close(layer);
        }
        GenerationStatus::Completed
    }

    /// Intern, evaluate and register the candidates of one rule, batch by batch.
    fn process(
        &mut self,
        rule: Rule,
        k: u32,
        mut candidates: impl Iterator<Item = Node>,
    ) -> ControlFlow<GenerationStatus> {
        let mut batch = Vec::with_capacity(self.config.batch_size);
        loop {
            batch.clear();
            batch.extend(candidates.by_ref().take(self.config.batch_size));
            if batch.is_empty() {
                return ControlFlow::Continue(());
            }
            if self.past_deadline() {
                info!("time limit reached at layer {} ({})", k, rule);
                return ControlFlow::Break(GenerationStatus::TimeLimitReached);
            }

            let mut pending = Vec::with_capacity(batch.len());
            for &node in &batch {
                let (element, _) = self.factory.intern(node);
                let stats = self.statistics.rule_mut(rule);
                stats.candidates += 1;
                if self.reducer.mark_seen(element) {
                    pending.push((element, node));
                } else {
                    stats.record(Registration::Known);
                }
            }

            let evaluator = self.reducer.evaluator();
            let vectors: Vec<_> = if self.config.parallel {
                pending.par_iter().map(|(_, node)| evaluator.compute(node)).collect()
            } else {
                pending.iter().map(|(_, node)| evaluator.compute(node)).collect()
            };
            self.statistics.evaluations += vectors.len();

            for ((element, _), vector) in pending.into_iter().zip(vectors) {
                let registration = self.reducer.insert(element, Arc::new(vector));
                self.statistics.rule_mut(rule).record(registration);
                if registration != Registration::Kept {
                    continue;
                }
                if log_enabled!(Level::Debug) {
                    debug!("kept {} (complexity {})", self.factory.repr(element), k);
                }
                match element.kind() {
                    ElementKind::Concept | ElementKind::Role => self.layer.push(element),
                    ElementKind::Boolean | ElementKind::Numerical => {
                        self.features.push(Feature::new(self.factory, element));
                        if self.features.len() >= self.config.feature_limit {
                            info!("feature limit of {} reached", self.config.feature_limit);
                            return ControlFlow::Break(GenerationStatus::FeatureLimitReached);
                        }
                    }
                }
            }
        }
    }

    fn finish(mut self, status: GenerationStatus) -> Generation {
        self.statistics.elapsed = self.start.elapsed();
        self.statistics.cached_vectors = self.reducer.evaluator().cache().len();
        self.statistics.factory_size = self.factory.len();
        self.statistics.log();
        info!(
            "generated {} features in {:.3?} ({:?})",
            self.features.len(),
            self.statistics.elapsed,
            status
        );
        Generation {
            features: self.features,
            status,
            statistics: self.statistics,
        }
    }
}
