//! Module placement module.
//!
//! Placement hints map application modules to devices, by name or by tier.
//! A [`PlacementPolicy`] resolves them against the topology before the
//! application is submitted.

pub mod mapping;
pub mod policy;

pub use mapping::{ModuleMapping, PlacementTarget, ResolvedPlacement};
pub use policy::{PlacementMode, PlacementPolicy, PlacementRequest, StaticPlacement};

use crate::topology::DeviceClass;

/// Placement resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementError {
    #[error("Placement hint names module '{0}', which the application does not declare")]
    UnknownModule(String),

    #[error("Placement hint for '{module}' names unknown device '{device}'")]
    UnknownDevice { module: String, device: String },

    #[error("Placement hint for '{0}' lists no devices")]
    EmptyTarget(String),

    #[error("Placement hint for '{module}' targets tier '{}', which has no devices", class.as_str())]
    EmptyClass { module: String, class: DeviceClass },

    #[error("No placement for modules: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}
