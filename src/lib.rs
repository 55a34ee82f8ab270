//! # agrifog - Fog scenario builder for smart-agriculture simulations
//!
//! This library builds the declarative inputs of a fog/edge discrete-event
//! simulation: a device hierarchy with sensors and actuators, a
//! data-processing application graph, and a mapping of application modules
//! onto devices. The assembled scenario is handed to an external engine.
//!
//! ## Overview
//!
//! The reference scenario monitors farms: soil and climate sensors report to
//! LoRa gateways, gateways preprocess readings, a fog server per farm runs
//! analytics and drives irrigation, and the cloud archives data.
//!
//! ```text
//! cloud (level 0)
//! |-- fog-farm-0 (level 1, 80 ms uplink)
//! |   |-- gw-0-0 (level 2, 5 ms uplink)
//! |   |   |-- s-gw-0-0-{0..n}   sensors (ENV_SENSOR)
//! |   |   \-- irrig-gw-0-0      actuator (IRRIGATION_CTRL)
//! |   \-- gw-0-1 ...
//! \-- fog-farm-1 ...
//! ```
//!
//! ## Architecture
//!
//! - `ids`: identity generator owned by the construction context
//! - `topology`: device factory, endpoints, sensing distributions, topology builder
//! - `application`: application graph builder and the smart-agriculture graph
//! - `placement`: module mapping, resolution and placement policies
//! - `scenario`: scenario assembly and the simulation engine seam
//! - `config` / `config_loader`: YAML configuration
//! - `export`: scenario and registry files
//! - `telemetry`: synthetic sensor readings
//! - `utils`: validation helpers
//!
//! ## Example Usage
//!
//! ```rust
//! use agrifog::config::ScenarioConfig;
//! use agrifog::scenario::assemble;
//!
//! let scenario = assemble(&ScenarioConfig::default())?;
//!
//! assert_eq!(scenario.topology().devices().len(), 7);
//! assert_eq!(scenario.topology().sensors().len(), 40);
//! assert_eq!(scenario.topology().actuators().len(), 4);
//! # Ok::<(), agrifog::error::ScenarioError>(())
//! ```
//!
//! ## Error Handling
//!
//! Construction errors are typed (`ScenarioError`, `GraphError`,
//! `PlacementError`, `ValidationError`). File handling and the engine seam
//! return `color_eyre` reports with context.

pub mod error;
pub mod ids;
pub mod topology;
pub mod application;
pub mod placement;
pub mod scenario;
pub mod config;
pub mod config_loader;
pub mod export;
pub mod telemetry;
pub mod utils;
