//! # dlgen-rs: Description-logic feature generation in Rust
//!
//! **`dlgen-rs`** enumerates description-logic expressions over a planning
//! vocabulary and keeps those that distinguish a sample of states.
//! The selected boolean and numerical expressions are *features*: functions
//! from states to `bool` or `u32` that a learner can use to describe a domain.
//!
//! ## Overview
//!
//! - A [`Vocabulary`][crate::vocabulary::Vocabulary] declares predicates (with arity) and constants.
//! - An [`Instance`][crate::instance::Instance] adds objects and ground atoms; a [`State`][crate::state::State] is a set of true atoms.
//! - The [`ElementFactory`][crate::factory::ElementFactory] hash-conses expressions: structurally equal expressions get the same handle.
//!   Each expression has a *complexity*: one for primitives, one plus the sum of the children otherwise.
//! - Expressions are evaluated per state ([`ElementFactory::evaluate`][crate::factory::ElementFactory::evaluate])
//!   or over a whole sample ([`SampleEvaluator`][crate::eval::SampleEvaluator]).
//! - The [`FeatureGenerator`][crate::generator::FeatureGenerator] enumerates expressions layer by layer and keeps one expression per
//!   denotation vector ([`EquivalenceReducer`][crate::reducer::EquivalenceReducer]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dlgen_rs::factory::ElementFactory;
//! use dlgen_rs::generator::FeatureGenerator;
//! use dlgen_rs::instance::Instance;
//! use dlgen_rs::state::State;
//! use dlgen_rs::vocabulary::Vocabulary;
//!
//! let mut vocabulary = Vocabulary::new();
//! vocabulary.add_predicate("clear", 1)?;
//! vocabulary.add_predicate("arm-empty", 0)?;
//! let vocabulary = Arc::new(vocabulary);
//!
//! let mut instance = Instance::new(0, vocabulary.clone());
//! let clear_a = instance.add_atom("clear", &["a"])?;
//! let clear_b = instance.add_atom("clear", &["b"])?;
//! let arm = instance.add_atom("arm-empty", &[])?;
//! let instance = Arc::new(instance);
//!
//! let states = vec![
//!     State::new(instance.clone(), [clear_a, arm])?,
//!     State::new(instance.clone(), [clear_a, clear_b])?,
//! ];
//!
//! let factory = ElementFactory::new(vocabulary);
//! let features = FeatureGenerator::new().generate(&factory, &states, 3, 3, 3, 3, 3, 10.0, 100)?;
//! assert!(features.iter().any(|f| f.repr() == "b_nullary(arm-empty)"));
//! # Ok::<(), dlgen_rs::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`factory`]**: expression construction, with [`repr`] and [`parse`] for the canonical text form.
//! - **[`eval`]**: denotations of expressions in states.
//! - **[`generator`]**: the layered enumerator, configured by [`config`] and [`rules`].

pub mod bitset;
pub mod cache;
pub mod config;
pub mod denotation;
pub mod error;
pub mod eval;
pub mod factory;
pub mod feature;
pub mod generator;
pub mod instance;
pub mod node;
pub mod parse;
pub mod reducer;
pub mod reference;
pub mod repr;
pub mod rules;
pub mod state;
pub mod stats;
pub mod table;
pub mod types;
pub mod utils;
pub mod vocabulary;
