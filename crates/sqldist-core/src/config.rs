//! Module: config
//! Responsibility: tuning knobs for distance computation and their TOML loading.
//! Does not own: how the knobs are applied (see `eval` and `facade`).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid distance config toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{field} must be finite and > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

///
/// StringDistanceMode
///
/// How a failed string equality is scored.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StringDistanceMode {
    /// Length difference weighted by the maximum character distance plus
    /// per-position code-point differences.
    #[default]
    LeftAlignment,

    /// Every unequal pair scores the not-equal penalty.
    Constant,
}

///
/// DistanceConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistanceConfig {
    /// Penalty `K` for a satisfied `<>`/`NOT`/`NOT LIKE` that should fail,
    /// and for an unmatched subquery.
    pub not_equal_penalty: f64,

    /// Boundary penalty `ε` added to strict relational misses.
    pub boundary_epsilon: f64,

    pub string_distance: StringDistanceMode,

    /// Wall-clock budget of one `calculate` call in milliseconds; `0` disables.
    pub timeout_ms: u64,

    /// Keep translated conditions for the lifetime of the engine.
    pub cache_conditions: bool,
}

impl DistanceConfig {
    pub const DEFAULT_NOT_EQUAL_PENALTY: f64 = 1.0;
    pub const DEFAULT_BOUNDARY_EPSILON: f64 = 1.0;
    pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

    pub const DEFAULT: Self = Self {
        not_equal_penalty: Self::DEFAULT_NOT_EQUAL_PENALTY,
        boundary_epsilon: Self::DEFAULT_BOUNDARY_EPSILON,
        string_distance: StringDistanceMode::LeftAlignment,
        timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        cache_conditions: true,
    };

    /// Parse and validate a config from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("not_equal_penalty", self.not_equal_penalty),
            ("boundary_epsilon", self.boundary_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }

    /// Evaluation budget, or `None` when timeouts are disabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub const fn with_string_distance(mut self, mode: StringDistanceMode) -> Self {
        self.string_distance = mode;
        self
    }

    #[must_use]
    pub const fn with_cache_conditions(mut self, enabled: bool) -> Self {
        self.cache_conditions = enabled;
        self
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

///
/// TESTS
///
