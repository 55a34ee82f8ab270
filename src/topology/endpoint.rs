//! Sensors and actuators attached to gateway devices.
//!
//! The gateway binding is a constructor argument: an endpoint cannot exist
//! without one, and it never changes afterwards.

use serde::Serialize;

use super::distribution::Distribution;
use super::types::DeviceId;

/// A data source emitting tuples of one type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    name: String,
    tuple_type: String,
    user_id: u32,
    app_id: String,
    interval: Distribution,
    gateway: DeviceId,
    /// Sensor to gateway transmission latency (ms)
    latency: f64,
}

impl Sensor {
    pub fn new(
        name: impl Into<String>,
        tuple_type: impl Into<String>,
        user_id: u32,
        app_id: impl Into<String>,
        interval: Distribution,
        gateway: DeviceId,
        latency: f64,
    ) -> Self {
        Sensor {
            name: name.into(),
            tuple_type: tuple_type.into(),
            user_id,
            app_id: app_id.into(),
            interval,
            gateway,
            latency,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuple_type(&self) -> &str {
        &self.tuple_type
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn interval(&self) -> &Distribution {
        &self.interval
    }

    pub fn gateway(&self) -> DeviceId {
        self.gateway
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }
}

/// A command sink consuming tuples addressed to its actuator type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actuator {
    name: String,
    actuator_type: String,
    user_id: u32,
    app_id: String,
    gateway: DeviceId,
    /// Gateway to actuator transmission latency (ms)
    latency: f64,
}

impl Actuator {
    pub fn new(
        name: impl Into<String>,
        actuator_type: impl Into<String>,
        user_id: u32,
        app_id: impl Into<String>,
        gateway: DeviceId,
        latency: f64,
    ) -> Self {
        Actuator {
            name: name.into(),
            actuator_type: actuator_type.into(),
            user_id,
            app_id: app_id.into(),
            gateway,
            latency,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actuator_type(&self) -> &str {
        &self.actuator_type
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn gateway(&self) -> DeviceId {
        self.gateway
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }
}
