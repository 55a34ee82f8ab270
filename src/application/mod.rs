//! Application graph module.
//!
//! An application is a directed graph whose vertices are sensor tuple types,
//! processing modules and actuator types. Edges are typed (SENSOR, MODULE,
//! ACTUATOR) and carry tuple costs. Modules declare tuple mappings: the
//! independent probability that an incoming tuple type is forwarded as an
//! outgoing one. Loops name paths whose end-to-end latency the simulation
//! engine tracks; each one is checked against the edge set when the graph is
//! built.

pub mod types;
pub mod error;
pub mod builder;
pub mod smart_agri;

pub use types::{AppEdge, AppLoop, AppModule, Direction, EdgeId, EdgeKind, EdgeSpec, Selectivity, TupleMapping};
pub use error::GraphError;
pub use builder::{Application, ApplicationBuilder};
pub use smart_agri::{smart_agri_application, AnalyticsSelectivity};
