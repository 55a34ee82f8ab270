//! Fog hierarchy assembly.
//!
//! Builds the cloud root, one fog server per farm, the gateways of every
//! farm, and the sensors and actuator bound to each gateway. Farms are
//! independent of each other, so they can also be built on a rayon pool;
//! results are merged in farm index order either way.

use std::collections::HashMap;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::ids::IdGenerator;
use crate::utils::validation::{validate_name, validate_non_negative};

use super::device::create_fog_device;
use super::distribution::Distribution;
use super::endpoint::{Actuator, Sensor};
use super::naming::{actuator_name, farm_server_name, gateway_name, sensor_name, CLOUD_NAME};
use super::types::{DeviceClass, DeviceId, DeviceSpec, FogDevice};

/// Workload shape of the topology
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyParams {
    pub farms: usize,
    pub gateways_per_farm: usize,
    pub sensors_per_gateway: usize,
    pub sensing_interval: Distribution,
}

impl TopologyParams {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.farms > 0 && self.gateways_per_farm == 0 {
            return Err(ScenarioError::invalid(
                "gateways_per_farm",
                "every farm needs at least one gateway",
            ));
        }
        self.sensing_interval.validate()
    }
}

impl Default for TopologyParams {
    fn default() -> Self {
        TopologyParams {
            farms: 2,
            gateways_per_farm: 2,
            sensors_per_gateway: 10,
            sensing_interval: Distribution::default(),
        }
    }
}

/// Per-tier device profiles, link latencies and endpoint type tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyProfiles {
    pub cloud: DeviceSpec,
    pub farm_server: DeviceSpec,
    pub gateway: DeviceSpec,
    /// WAN+MAN latency from a farm server to the cloud (ms)
    pub farm_uplink_latency: f64,
    /// LoRa backhaul latency from a gateway to its farm server (ms)
    pub gateway_uplink_latency: f64,
    pub sensor_latency: f64,
    pub actuator_latency: f64,
    /// Tuple type emitted by every sensor
    pub sensor_type: String,
    /// Actuator type of every irrigation actuator
    pub actuator_type: String,
}

impl TopologyProfiles {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let tiers = [
            ("profiles.cloud", &self.cloud, DeviceClass::Cloud),
            ("profiles.farm_server", &self.farm_server, DeviceClass::FarmServer),
            ("profiles.gateway", &self.gateway, DeviceClass::Gateway),
        ];
        for (parameter, spec, class) in tiers {
            spec.validate(parameter)?;
            if spec.level != class.level() {
                return Err(ScenarioError::invalid(
                    format!("{}.level", parameter),
                    format!("{} devices sit at level {}, got {}", class.as_str(), class.level(), spec.level),
                ));
            }
        }

        let latencies = [
            ("profiles.farm_uplink_latency", self.farm_uplink_latency),
            ("profiles.gateway_uplink_latency", self.gateway_uplink_latency),
            ("profiles.sensor_latency", self.sensor_latency),
            ("profiles.actuator_latency", self.actuator_latency),
        ];
        for (parameter, value) in latencies {
            validate_non_negative(value).map_err(|e| ScenarioError::invalid(parameter, e))?;
        }

        validate_name(&self.sensor_type).map_err(|e| ScenarioError::invalid("profiles.sensor_type", e))?;
        validate_name(&self.actuator_type).map_err(|e| ScenarioError::invalid("profiles.actuator_type", e))?;
        if self.sensor_type == self.actuator_type {
            return Err(ScenarioError::invalid(
                "profiles.actuator_type",
                "sensor and actuator types must differ",
            ));
        }
        Ok(())
    }
}

impl Default for TopologyProfiles {
    fn default() -> Self {
        TopologyProfiles {
            cloud: DeviceSpec::cloud(),
            farm_server: DeviceSpec::farm_server(),
            gateway: DeviceSpec::gateway(),
            farm_uplink_latency: 80.0,
            gateway_uplink_latency: 5.0,
            sensor_latency: 1.0,
            actuator_latency: 0.5,
            sensor_type: "ENV_SENSOR".to_string(),
            actuator_type: "IRRIGATION_CTRL".to_string(),
        }
    }
}

/// The finished device tree with its endpoints
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    devices: Vec<FogDevice>,
    sensors: Vec<Sensor>,
    actuators: Vec<Actuator>,
    #[serde(skip)]
    by_id: HashMap<DeviceId, usize>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Topology {
    /// Seal a set of devices and endpoints, checking the tree invariants
    pub fn from_parts(
        devices: Vec<FogDevice>,
        sensors: Vec<Sensor>,
        actuators: Vec<Actuator>,
    ) -> Result<Self, ScenarioError> {
        let mut by_id = HashMap::with_capacity(devices.len());
        let mut by_name = HashMap::with_capacity(devices.len());
        for (idx, device) in devices.iter().enumerate() {
            if by_id.insert(device.id(), idx).is_some() {
                return Err(ScenarioError::InvalidTopology(format!("duplicate device id {}", device.id())));
            }
            if by_name.insert(device.name().to_string(), idx).is_some() {
                return Err(ScenarioError::InvalidTopology(format!(
                    "duplicate device name '{}'",
                    device.name()
                )));
            }
        }

        let topology = Topology { devices, sensors, actuators, by_id, by_name };
        topology.validate()?;
        Ok(topology)
    }

    /// Check the hierarchy invariants.
    ///
    /// - exactly one root, at level 0
    /// - every other device has an existing parent one level above it
    /// - every sensor and actuator is bound to an existing leaf device
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut roots = self.devices.iter().filter(|d| d.is_root());
        let root = roots
            .next()
            .ok_or_else(|| ScenarioError::InvalidTopology("no root device".to_string()))?;
        if let Some(extra) = roots.next() {
            return Err(ScenarioError::InvalidTopology(format!(
                "more than one root device ('{}' and '{}')",
                root.name(),
                extra.name()
            )));
        }
        if root.level() != 0 {
            return Err(ScenarioError::InvalidTopology(format!(
                "root device '{}' is at level {}, expected 0",
                root.name(),
                root.level()
            )));
        }

        for device in &self.devices {
            let Some(parent_id) = device.parent() else { continue };
            let parent = self.device(parent_id).ok_or_else(|| {
                ScenarioError::InvalidTopology(format!(
                    "device '{}' references missing parent {}",
                    device.name(),
                    parent_id
                ))
            })?;
            if device.level() != parent.level() + 1 {
                return Err(ScenarioError::InvalidTopology(format!(
                    "device '{}' is at level {} but its parent '{}' is at level {}",
                    device.name(),
                    device.level(),
                    parent.name(),
                    parent.level()
                )));
            }
        }

        let bindings = self
            .sensors
            .iter()
            .map(|s| (s.name(), s.gateway()))
            .chain(self.actuators.iter().map(|a| (a.name(), a.gateway())));
        for (endpoint, gateway) in bindings {
            let device = self.device(gateway).ok_or_else(|| {
                ScenarioError::InvalidTopology(format!(
                    "'{}' is bound to missing gateway {}",
                    endpoint, gateway
                ))
            })?;
            if self.children(gateway).next().is_some() {
                return Err(ScenarioError::InvalidTopology(format!(
                    "'{}' is bound to '{}', which is not a leaf device",
                    endpoint,
                    device.name()
                )));
            }
        }
        Ok(())
    }

    pub fn devices(&self) -> &[FogDevice] {
        &self.devices
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn actuators(&self) -> &[Actuator] {
        &self.actuators
    }

    pub fn root(&self) -> Option<&FogDevice> {
        self.devices.iter().find(|d| d.is_root())
    }

    pub fn device(&self, id: DeviceId) -> Option<&FogDevice> {
        self.by_id.get(&id).map(|&idx| &self.devices[idx])
    }

    pub fn device_by_name(&self, name: &str) -> Option<&FogDevice> {
        self.by_name.get(name).map(|&idx| &self.devices[idx])
    }

    /// Direct children of a device
    pub fn children(&self, id: DeviceId) -> impl Iterator<Item = &FogDevice> {
        self.devices.iter().filter(move |d| d.parent() == Some(id))
    }

    pub fn devices_at_level(&self, level: u32) -> impl Iterator<Item = &FogDevice> {
        self.devices.iter().filter(move |d| d.level() == level)
    }

    /// Devices at the gateway tier
    pub fn gateways(&self) -> impl Iterator<Item = &FogDevice> {
        self.devices_at_level(DeviceClass::Gateway.level())
    }

    /// Sensors bound to a device
    pub fn sensors_of(&self, gateway: DeviceId) -> impl Iterator<Item = &Sensor> {
        self.sensors.iter().filter(move |s| s.gateway() == gateway)
    }

    /// Actuators bound to a device
    pub fn actuators_of(&self, gateway: DeviceId) -> impl Iterator<Item = &Actuator> {
        self.actuators.iter().filter(move |a| a.gateway() == gateway)
    }

    /// Distinct sensor tuple types, in first-seen order
    pub fn sensor_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for sensor in &self.sensors {
            if !types.contains(&sensor.tuple_type()) {
                types.push(sensor.tuple_type());
            }
        }
        types
    }

    /// Distinct actuator types, in first-seen order
    pub fn actuator_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for actuator in &self.actuators {
            if !types.contains(&actuator.actuator_type()) {
                types.push(actuator.actuator_type());
            }
        }
        types
    }
}

/// Devices and endpoints produced for one farm
struct FarmParts {
    devices: Vec<FogDevice>,
    sensors: Vec<Sensor>,
    actuators: Vec<Actuator>,
}

/// Assembles a [`Topology`] from parameters and profiles
#[derive(Debug, Clone)]
pub struct TopologyBuilder<'a> {
    params: &'a TopologyParams,
    profiles: &'a TopologyProfiles,
    user_id: u32,
    app_id: &'a str,
}

impl<'a> TopologyBuilder<'a> {
    /// `user_id` and `app_id` identify the application owning the endpoints
    pub fn new(params: &'a TopologyParams, profiles: &'a TopologyProfiles, user_id: u32, app_id: &'a str) -> Self {
        TopologyBuilder { params, profiles, user_id, app_id }
    }

    /// Build farms one after the other
    pub fn build(&self, ids: &IdGenerator) -> Result<Topology, ScenarioError> {
        let cloud = self.prepare(ids)?;
        let cloud_id = cloud.id();
        let farms = (0..self.params.farms)
            .map(|farm| self.build_farm(farm, cloud_id, ids))
            .collect::<Result<Vec<_>, _>>()?;
        self.finish(cloud, farms)
    }

    /// Build farms concurrently.
    ///
    /// Identities come from the shared atomic generator, so their values
    /// depend on scheduling; names and structure do not.
    pub fn build_parallel(&self, ids: &IdGenerator) -> Result<Topology, ScenarioError> {
        let cloud = self.prepare(ids)?;
        let cloud_id = cloud.id();
        let farms = (0..self.params.farms)
            .into_par_iter()
            .map(|farm| self.build_farm(farm, cloud_id, ids))
            .collect::<Result<Vec<_>, _>>()?;
        self.finish(cloud, farms)
    }

    fn prepare(&self, ids: &IdGenerator) -> Result<FogDevice, ScenarioError> {
        self.params.validate()?;
        self.profiles.validate()?;
        info!(
            "Building topology: {} farms x {} gateways x {} sensors (mean interval {}s)",
            self.params.farms,
            self.params.gateways_per_farm,
            self.params.sensors_per_gateway,
            self.params.sensing_interval.mean_interval()
        );
        create_fog_device(CLOUD_NAME, &self.profiles.cloud, ids)
    }

    fn build_farm(&self, farm: usize, cloud: DeviceId, ids: &IdGenerator) -> Result<FarmParts, ScenarioError> {
        let params = self.params;
        let profiles = self.profiles;

        let mut devices = Vec::with_capacity(1 + params.gateways_per_farm);
        let mut sensors = Vec::with_capacity(params.gateways_per_farm * params.sensors_per_gateway);
        let mut actuators = Vec::with_capacity(params.gateways_per_farm);

        let mut farm_server = create_fog_device(farm_server_name(farm), &profiles.farm_server, ids)?;
        farm_server.attach_to(cloud, profiles.farm_uplink_latency);
        let farm_id = farm_server.id();
        devices.push(farm_server);

        for gw in 0..params.gateways_per_farm {
            let mut gateway = create_fog_device(gateway_name(farm, gw), &profiles.gateway, ids)?;
            gateway.attach_to(farm_id, profiles.gateway_uplink_latency);
            let gateway_id = gateway.id();
            devices.push(gateway);

            for s in 0..params.sensors_per_gateway {
                sensors.push(Sensor::new(
                    sensor_name(farm, gw, s),
                    profiles.sensor_type.clone(),
                    self.user_id,
                    self.app_id,
                    params.sensing_interval.clone(),
                    gateway_id,
                    profiles.sensor_latency,
                ));
            }

            actuators.push(Actuator::new(
                actuator_name(farm, gw),
                profiles.actuator_type.clone(),
                self.user_id,
                self.app_id,
                gateway_id,
                profiles.actuator_latency,
            ));
        }

        debug!(
            "Farm {}: {} devices, {} sensors, {} actuators",
            farm,
            devices.len(),
            sensors.len(),
            actuators.len()
        );
        Ok(FarmParts { devices, sensors, actuators })
    }

    fn finish(&self, cloud: FogDevice, farms: Vec<FarmParts>) -> Result<Topology, ScenarioError> {
        let mut devices = vec![cloud];
        let mut sensors = Vec::new();
        let mut actuators = Vec::new();
        for part in farms {
            devices.extend(part.devices);
            sensors.extend(part.sensors);
            actuators.extend(part.actuators);
        }

        let topology = Topology::from_parts(devices, sensors, actuators)?;
        info!(
            "Topology ready: {} devices, {} sensors, {} actuators",
            topology.devices().len(),
            topology.sensors().len(),
            topology.actuators().len()
        );
        Ok(topology)
    }
}
