//! Sensing-interval distributions.
//!
//! A sensor declares how long it waits between two samples. The simulation
//! engine draws from the distribution at runtime; scenario construction only
//! validates and records it.

use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::utils::validation::{validate_non_negative, validate_positive};

/// Redraws allowed before a normal sample falls back to the mean
const MAX_REDRAWS: usize = 64;

/// Inter-sample timing of a sensor, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    /// Fixed interval
    Deterministic { value: f64 },
    /// Normally distributed interval, truncated to positive values
    Normal { mean: f64, stdev: f64 },
    /// Uniform interval in `[min, max]`
    Uniform { min: f64, max: f64 },
}

impl Distribution {
    pub fn deterministic(value: f64) -> Self {
        Distribution::Deterministic { value }
    }

    /// Reject intervals that could produce a non-positive sample
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let param = |field: &str| format!("sensing_interval.{}", field);
        match *self {
            Distribution::Deterministic { value } => {
                validate_positive(value).map_err(|e| ScenarioError::invalid(param("value"), e))
            }
            Distribution::Normal { mean, stdev } => {
                validate_positive(mean).map_err(|e| ScenarioError::invalid(param("mean"), e))?;
                validate_non_negative(stdev).map_err(|e| ScenarioError::invalid(param("stdev"), e))
            }
            Distribution::Uniform { min, max } => {
                validate_positive(min).map_err(|e| ScenarioError::invalid(param("min"), e))?;
                validate_positive(max).map_err(|e| ScenarioError::invalid(param("max"), e))?;
                if min > max {
                    return Err(ScenarioError::invalid(
                        param("min"),
                        format!("min {} is greater than max {}", min, max),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Expected interval
    pub fn mean_interval(&self) -> f64 {
        match *self {
            Distribution::Deterministic { value } => value,
            Distribution::Normal { mean, .. } => mean,
            Distribution::Uniform { min, max } => (min + max) / 2.0,
        }
    }

    /// Draw the next interval. Always positive for a validated distribution.
    pub fn next_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Distribution::Deterministic { value } => value,
            Distribution::Normal { mean, stdev } => {
                let normal = match Normal::new(mean, stdev) {
                    Ok(normal) => normal,
                    Err(_) => return mean,
                };
                (0..MAX_REDRAWS)
                    .map(|_| normal.sample(rng))
                    .find(|sample| *sample > 0.0)
                    .unwrap_or(mean)
            }
            Distribution::Uniform { min, max } => {
                if min >= max {
                    min
                } else {
                    rng.gen_range(min..=max)
                }
            }
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::deterministic(5.0)
    }
}
