//! Scenario export module.
//!
//! Serializes an assembled scenario for the simulation engine and for
//! external tooling:
//!
//! ```text
//! <output>/
//! |-- scenario.yaml          # topology, application graph, mapping, mode
//! |-- device_registry.json   # flat device list with parents and placed modules
//! \-- telemetry.jsonl        # optional synthetic readings
//! ```

pub mod registry;
pub mod writer;

pub use registry::{DeviceInfo, DeviceRegistry};
pub use writer::{write_scenario, write_telemetry, ExportedFiles, REGISTRY_FILE, SCENARIO_FILE, TELEMETRY_FILE};
