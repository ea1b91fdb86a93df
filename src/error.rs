//! Error types.
//!
//! Construction errors are reported by the vocabulary, instance, state and
//! factory constructors; configuration errors are reported before a
//! generation run starts. Running out of time or feature budget is not an
//! error, see [`GenerationStatus`][crate::generator::GenerationStatus].

use thiserror::Error;

/// Failure to build a symbol, state or expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("predicate `{predicate}/{arity}` cannot be used here: {expected}")]
    InvalidArity {
        predicate: String,
        arity: usize,
        expected: String,
    },

    #[error("rule `{rule}` expects {expected}, got ({found})")]
    TypeMismatch {
        rule: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("rule `{rule}` takes symbol arguments and cannot be built from sub-expressions")]
    NotComposite { rule: &'static str },

    #[error("unknown predicate `{name}`")]
    UnknownPredicate { name: String },

    #[error("predicate `{name}` is already declared with arity {existing}, not {arity}")]
    ConflictingPredicate {
        name: String,
        arity: usize,
        existing: usize,
    },

    #[error("unknown constant `{name}`")]
    UnknownConstant { name: String },

    #[error("atom over `{predicate}/{arity}` given {got} objects")]
    AtomArity {
        predicate: String,
        arity: usize,
        got: usize,
    },

    #[error("atom `{atom}` is already declared with a different static flag")]
    ConflictingAtom { atom: String },

    #[error("atom index {atom} does not belong to instance {instance}")]
    ForeignAtom { atom: u32, instance: u32 },

    #[error("static atom `{atom}` cannot be part of a state")]
    StaticAtomInState { atom: String },

    #[error("cannot parse `{input}`: {message}")]
    Parse { input: String, message: String },
}

/// Invalid generator configuration or state sample.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{category} complexity limit must be positive")]
    ZeroComplexityLimit { category: &'static str },

    #[error("{category} complexity limit {limit} exceeds the maximum of {max}")]
    ComplexityLimitTooLarge {
        category: &'static str,
        limit: u32,
        max: u32,
    },

    #[error("time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(f64),

    #[error("feature limit must be positive")]
    ZeroFeatureLimit,

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error("the state sample is empty")]
    EmptySample,

    #[error("state {state} belongs to an instance over a different vocabulary")]
    VocabularyMismatch { state: usize },

    #[error("invalid configuration file: {0}")]
    Toml(String),
}

/// Top-level error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
