//! Scenario construction errors.
//!
//! Every failure here aborts the whole assembly; no partial topology, graph or
//! mapping is ever handed to the simulation engine.

use crate::application::GraphError;
use crate::placement::PlacementError;

/// Errors raised while building a scenario
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A construction parameter is out of range
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// The identity generator ran out of values
    #[error("Identity space exhausted: no more device or entity ids can be allocated")]
    IdsExhausted,

    /// The device tree does not satisfy the hierarchy invariants
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A sensor in the topology emits a tuple type that no SENSOR edge consumes
    #[error("Sensor tuple type '{0}' has no SENSOR edge in the application graph")]
    UnmatchedSensorType(String),

    /// An actuator in the topology listens for a type that no ACTUATOR edge targets
    #[error("Actuator type '{0}' has no ACTUATOR edge in the application graph")]
    UnmatchedActuatorType(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

impl ScenarioError {
    /// Shorthand for [`ScenarioError::InvalidParameter`]
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        ScenarioError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
