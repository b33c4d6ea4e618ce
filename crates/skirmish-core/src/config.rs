//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::skill::PooledSkillFactory;

/// Tunables for one battle.
///
/// Every field has a default, so partial JSON is accepted:
///
/// ```
/// use skirmish_core::config::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.default_max_stack, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the battle RNG (chance rolls, random dispels).
    pub seed: u64,
    /// Stack cap used when a stackable effect declares none.
    pub default_max_stack: u32,
    /// Initial free-list capacity of each actor's instance pool.
    pub pool_capacity: usize,
    /// Length of presentation waits (move, return) in seconds.
    pub presentation_wait_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            default_max_stack: 5,
            pool_capacity: PooledSkillFactory::DEFAULT_CAPACITY,
            presentation_wait_secs: 0.5,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_max_stack == 0 {
            return Err(ConfigError::Invalid {
                field: "default_max_stack",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.presentation_wait_secs.is_finite() || self.presentation_wait_secs < 0.0 {
            return Err(ConfigError::Invalid {
                field: "presentation_wait_secs",
                reason: format!("{} is not a non-negative number", self.presentation_wait_secs),
            });
        }
        Ok(())
    }

    /// Replaces the seed (builder pattern).
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
