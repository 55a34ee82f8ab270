//! Scenario assembly module.
//!
//! A scenario is the broker identity, the application graph, the device
//! topology and the module mapping, checked against each other and frozen
//! before it is handed to a simulation engine.

pub mod context;
pub mod assembler;

pub use context::ScenarioContext;
pub use assembler::{assemble, assemble_with, build_module_mapping, Scenario, SimulationEngine, Submission};
