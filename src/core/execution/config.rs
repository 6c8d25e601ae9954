//! Configuration for the communication network simulation
//!
//! This module provides configuration types for controlling how the connectivity
//! sweep is amortized and executed, including concurrency settings and thread
//! pool management.

use crate::core::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Number of steps over which one full pairwise sweep completes
pub const DEFAULT_SWEEP_PERIOD: usize = 50;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Link predicate is evaluated pair by pair on the calling thread
    #[default]
    Sequential,
    /// Link predicate calls for a row are evaluated on a Rayon pool; adjacency
    /// writes stay on the calling thread
    Rayon,
}

/// Configuration for the communication network
///
/// Can be built with the `with_*` methods or read from a JSON settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommNetConfig {
    /// Steps per full sweep (R)
    pub sweep_period: usize,
    /// The concurrency mode to use for the sweep
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
}

impl CommNetConfig {
    /// Create a new configuration with default values
    ///
    /// Default configuration sweeps over 50 steps in Sequential mode
    pub fn new() -> Self {
        Self {
            sweep_period: DEFAULT_SWEEP_PERIOD,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
        }
    }

    /// Set the number of steps over which a full sweep completes
    pub fn with_sweep_period(mut self, steps: usize) -> Self {
        self.sweep_period = steps;
        self
    }

    /// Set the concurrency mode for the sweep
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_period == 0 {
            return Err(ConfigError::InvalidSweepPeriod(self.sweep_period));
        }
        if let Some(0) = self.thread_pool_size {
            return Err(ConfigError::InvalidThreadPoolSize(0));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for CommNetConfig {
    fn default() -> Self {
        Self::new()
    }
}
