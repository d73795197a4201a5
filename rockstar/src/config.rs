//! Interpreter configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {field} must be greater than zero")]
    Zero { field: &'static str },
}

/// Runtime limits for the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Nested function calls allowed before a stack overflow error
    pub max_call_depth: usize,
    /// Remaining native stack (bytes) that triggers growth
    pub stack_red_zone: usize,
    /// Bytes added each time the native stack grows
    pub stack_grow_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: 10_000,
            stack_red_zone: 128 * 1024,
            stack_grow_size: 4 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Parse from TOML; missing fields keep their defaults
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Zero {
                field: "max_call_depth",
            });
        }
        if self.stack_grow_size == 0 {
            return Err(ConfigError::Zero {
                field: "stack_grow_size",
            });
        }
        Ok(())
    }
}
