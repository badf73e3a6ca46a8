//! Fill engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::data::duration_serde;
use crate::error::FillError;

/// Tunable parameters of the fill engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillConfig {
    /// A resolved price older than this (relative to the simulation
    /// clock) gets a stale-price warning attached to the fill.
    #[serde(with = "duration_serde", default = "default_stale_price_threshold")]
    pub stale_price_threshold: Duration,
}

fn default_stale_price_threshold() -> Duration {
    Duration::hours(1)
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            stale_price_threshold: default_stale_price_threshold(),
        }
    }
}

impl FillConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FillError> {
        if self.stale_price_threshold <= Duration::zero() {
            return Err(FillError::invalid_config(
                "stale_price_threshold",
                "must be positive",
            ));
        }
        Ok(())
    }
}
