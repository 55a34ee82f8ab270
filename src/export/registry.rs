use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;

/// Per-device entry of `device_registry.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: u32,
    pub name: String,
    /// Tier name (`cloud`, `farm_server`, `gateway`)
    pub class: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub uplink_latency: f64,
    pub mips: u64,
    pub ram: u32,
    /// Modules statically placed on this device
    pub modules: Vec<String>,
    pub sensors: Vec<String>,
    pub actuators: Vec<String>,
}

/// Flat view of the device tree for tools outside the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRegistry {
    pub app_id: String,
    pub user_id: u32,
    pub devices: Vec<DeviceInfo>,
    /// Modules awaiting the dynamic placement policy
    pub unplaced_modules: Vec<String>,
}

impl DeviceRegistry {
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let topology = scenario.topology();
        let placement = scenario.placement();

        let devices = topology
            .devices()
            .iter()
            .map(|device| DeviceInfo {
                id: device.id().0,
                name: device.name().to_string(),
                class: device
                    .class()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_else(|| format!("level-{}", device.level())),
                level: device.level(),
                parent: device
                    .parent()
                    .and_then(|p| topology.device(p))
                    .map(|p| p.name().to_string()),
                uplink_latency: device.uplink_latency(),
                mips: device.mips(),
                ram: device.ram(),
                modules: placement
                    .assignments
                    .iter()
                    .filter(|(_, ids)| ids.contains(&device.id()))
                    .map(|(module, _)| module.clone())
                    .collect(),
                sensors: topology.sensors_of(device.id()).map(|s| s.name().to_string()).collect(),
                actuators: topology.actuators_of(device.id()).map(|a| a.name().to_string()).collect(),
            })
            .collect();

        DeviceRegistry {
            app_id: scenario.app_id().to_string(),
            user_id: scenario.user_id(),
            devices,
            unplaced_modules: placement.unresolved.clone(),
        }
    }

    pub fn device(&self, name: &str) -> Option<&DeviceInfo> {
        self.devices.iter().find(|d| d.name == name)
    }
}
