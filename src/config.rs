//! Generator configuration: complexity limits, budgets and enabled rules.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::RuleSet;

/// Largest accepted complexity limit.
pub const MAX_COMPLEXITY_LIMIT: u32 = 256;

/// Limits and rule toggles of a generation run.
///
/// Can be loaded from TOML; missing fields take their defaults:
///
/// ```toml
/// concept_complexity_limit = 5
/// time_limit_secs = 60.0
///
/// [rules]
/// disabled = ["c_diff", "r_or"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_complexity_limit")]
    pub concept_complexity_limit: u32,
    #[serde(default = "default_complexity_limit")]
    pub role_complexity_limit: u32,
    #[serde(default = "default_complexity_limit")]
    pub boolean_complexity_limit: u32,
    /// Limit for `n_count` features.
    #[serde(default = "default_complexity_limit")]
    pub count_numerical_complexity_limit: u32,
    /// Limit for `n_concept_distance` features.
    #[serde(default = "default_complexity_limit")]
    pub distance_numerical_complexity_limit: u32,
    /// Wall-clock budget, in seconds.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
    /// Maximum number of emitted features.
    #[serde(default = "default_feature_limit")]
    pub feature_limit: usize,
    #[serde(default)]
    pub rules: RuleSet,
    /// Evaluate candidate batches on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
    /// Number of candidates between two time-budget checks.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_complexity_limit() -> u32 {
    9
}
fn default_time_limit_secs() -> f64 {
    3600.0
}
fn default_feature_limit() -> usize {
    10_000
}
fn default_batch_size() -> usize {
    256
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            concept_complexity_limit: default_complexity_limit(),
            role_complexity_limit: default_complexity_limit(),
            boolean_complexity_limit: default_complexity_limit(),
            count_numerical_complexity_limit: default_complexity_limit(),
            distance_numerical_complexity_limit: default_complexity_limit(),
            time_limit_secs: default_time_limit_secs(),
            feature_limit: default_feature_limit(),
            rules: RuleSet::default(),
            parallel: false,
            batch_size: default_batch_size(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Set all five complexity limits at once: concept, role, boolean, count
    /// numerical and distance numerical.
    pub fn with_limits(mut self, concept: u32, role: u32, boolean: u32, count: u32, distance: u32) -> Self {
        self.concept_complexity_limit = concept;
        self.role_complexity_limit = role;
        self.boolean_complexity_limit = boolean;
        self.count_numerical_complexity_limit = count;
        self.distance_numerical_complexity_limit = distance;
        self
    }

    pub fn with_concept_complexity_limit(mut self, limit: u32) -> Self {
        self.concept_complexity_limit = limit;
        self
    }

    pub fn with_role_complexity_limit(mut self, limit: u32) -> Self {
        self.role_complexity_limit = limit;
        self
    }

    pub fn with_boolean_complexity_limit(mut self, limit: u32) -> Self {
        self.boolean_complexity_limit = limit;
        self
    }

    pub fn with_count_numerical_complexity_limit(mut self, limit: u32) -> Self {
        self.count_numerical_complexity_limit = limit;
        self
    }

    pub fn with_distance_numerical_complexity_limit(mut self, limit: u32) -> Self {
        self.distance_numerical_complexity_limit = limit;
        self
    }

    pub fn with_time_limit_secs(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    pub fn with_feature_limit(mut self, limit: usize) -> Self {
        self.feature_limit = limit;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// The largest of the complexity limits: the last layer to enumerate.
    pub fn max_complexity(&self) -> u32 {
        [
            self.concept_complexity_limit,
            self.role_complexity_limit,
            self.boolean_complexity_limit,
            self.count_numerical_complexity_limit,
            self.distance_numerical_complexity_limit,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// The time budget; saturates for budgets too large for a [`Duration`].
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, limit) in [
            ("concept", self.concept_complexity_limit),
            ("role", self.role_complexity_limit),
            ("boolean", self.boolean_complexity_limit),
            ("count numerical", self.count_numerical_complexity_limit),
            ("distance numerical", self.distance_numerical_complexity_limit),
        ] {
            if limit == 0 {
                return Err(ConfigError::ZeroComplexityLimit { category });
            }
            if limit > MAX_COMPLEXITY_LIMIT {
                return Err(ConfigError::ComplexityLimitTooLarge {
                    category,
                    limit,
                    max: MAX_COMPLEXITY_LIMIT,
                });
            }
        }
        // Also rejects NaN.
        if !(self.time_limit_secs > 0.0 && self.time_limit_secs.is_finite()) {
            return Err(ConfigError::InvalidTimeLimit(self.time_limit_secs));
        }
        if self.feature_limit == 0 {
            return Err(ConfigError::ZeroFeatureLimit);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}
