//! Fog device topology module.
//!
//! This module contains the device factory, the sensors and actuators bound
//! to gateways, sensing-interval distributions, the naming convention shared
//! with placement hints, and the builder that assembles the
//! cloud -> farm server -> gateway hierarchy.

pub mod types;
pub mod device;
pub mod distribution;
pub mod endpoint;
pub mod naming;
pub mod builder;

// Re-export key types and functions for easier access
pub use types::{DeviceClass, DeviceId, DeviceSpec, FogDevice};
pub use device::create_fog_device;
pub use distribution::Distribution;
pub use endpoint::{Actuator, Sensor};
pub use naming::{is_gateway_name, CLOUD_NAME};
pub use builder::{Topology, TopologyBuilder, TopologyParams, TopologyProfiles};
