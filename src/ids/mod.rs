//! Identity allocation module.
//!
//! Devices and simulation entities (the broker that owns the application)
//! receive integer identities from a generator owned by the scenario
//! construction context rather than from process-wide state.

pub mod generator;

pub use generator::IdGenerator;
