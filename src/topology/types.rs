//! Topology type definitions.
//!
//! Devices form a strict tree: the cloud sits at level 0, farm fog servers
//! at level 1 and gateways at level 2. Levels increase by exactly one along
//! every parent link.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;
use crate::utils::validation::{validate_non_negative, validate_positive};

/// Identity of a device in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tier of the fog hierarchy a device belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Cloud datacenter (root)
    Cloud,
    /// Farm-level fog server
    FarmServer,
    /// LoRa gateway aggregating sensors and actuators
    Gateway,
}

impl DeviceClass {
    /// Hierarchy level of this tier
    pub fn level(self) -> u32 {
        match self {
            DeviceClass::Cloud => 0,
            DeviceClass::FarmServer => 1,
            DeviceClass::Gateway => 2,
        }
    }

    pub fn from_level(level: u32) -> Option<Self> {
        match level {
            0 => Some(DeviceClass::Cloud),
            1 => Some(DeviceClass::FarmServer),
            2 => Some(DeviceClass::Gateway),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Cloud => "cloud",
            DeviceClass::FarmServer => "farm_server",
            DeviceClass::Gateway => "gateway",
        }
    }
}

/// Capacity and power parameters for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Compute capacity in million instructions per second
    pub mips: u64,
    /// Memory capacity
    pub ram: u32,
    pub up_bw: u64,
    pub down_bw: u64,
    /// Hierarchy level, 0 = cloud
    pub level: u32,
    /// Cost per unit of compute
    pub rate_per_mips: f64,
    /// Power draw at full utilisation (W)
    pub busy_power: f64,
    /// Power draw when idle (W)
    pub idle_power: f64,
}

impl DeviceSpec {
    /// Cloud datacenter profile
    pub fn cloud() -> Self {
        DeviceSpec {
            mips: 44800,
            ram: 40000,
            up_bw: 10000,
            down_bw: 10000,
            level: 0,
            rate_per_mips: 0.01,
            busy_power: 16.0 * 103.0,
            idle_power: 16.0 * 83.25,
        }
    }

    /// Farm fog server profile
    pub fn farm_server() -> Self {
        DeviceSpec {
            mips: 6000,
            ram: 8000,
            up_bw: 10000,
            down_bw: 10000,
            level: 1,
            rate_per_mips: 0.0,
            busy_power: 107.339,
            idle_power: 83.4333,
        }
    }

    /// LoRa gateway profile
    pub fn gateway() -> Self {
        DeviceSpec {
            mips: 1200,
            ram: 1000,
            up_bw: 10000,
            down_bw: 10000,
            level: 2,
            rate_per_mips: 0.0,
            busy_power: 87.53,
            idle_power: 82.44,
        }
    }

    /// Check capacities and power figures; `parameter` names the profile in errors
    pub fn validate(&self, parameter: &str) -> Result<(), ScenarioError> {
        if self.mips == 0 {
            return Err(ScenarioError::invalid(format!("{}.mips", parameter), "must be greater than zero"));
        }
        if self.ram == 0 {
            return Err(ScenarioError::invalid(format!("{}.ram", parameter), "must be greater than zero"));
        }
        validate_non_negative(self.rate_per_mips)
            .map_err(|e| ScenarioError::invalid(format!("{}.rate_per_mips", parameter), e))?;
        validate_positive(self.busy_power)
            .map_err(|e| ScenarioError::invalid(format!("{}.busy_power", parameter), e))?;
        validate_non_negative(self.idle_power)
            .map_err(|e| ScenarioError::invalid(format!("{}.idle_power", parameter), e))?;
        if self.idle_power > self.busy_power {
            return Err(ScenarioError::invalid(
                format!("{}.idle_power", parameter),
                format!("idle power {} exceeds busy power {}", self.idle_power, self.busy_power),
            ));
        }
        Ok(())
    }
}

/// A compute node in the fog hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FogDevice {
    id: DeviceId,
    name: String,
    mips: u64,
    ram: u32,
    up_bw: u64,
    down_bw: u64,
    level: u32,
    rate_per_mips: f64,
    busy_power: f64,
    idle_power: f64,
    /// Propagation latency to the parent (ms)
    uplink_latency: f64,
    parent: Option<DeviceId>,
}

impl FogDevice {
    pub(crate) fn new(id: DeviceId, name: String, spec: &DeviceSpec) -> Self {
        FogDevice {
            id,
            name,
            mips: spec.mips,
            ram: spec.ram,
            up_bw: spec.up_bw,
            down_bw: spec.down_bw,
            level: spec.level,
            rate_per_mips: spec.rate_per_mips,
            busy_power: spec.busy_power,
            idle_power: spec.idle_power,
            uplink_latency: 0.0,
            parent: None,
        }
    }

    /// Link this device under `parent`. Only the topology builder calls this,
    /// once per device, before the topology is sealed.
    pub(crate) fn attach_to(&mut self, parent: DeviceId, uplink_latency: f64) {
        debug_assert!(self.parent.is_none(), "device {} attached twice", self.name);
        self.parent = Some(parent);
        self.uplink_latency = uplink_latency;
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mips(&self) -> u64 {
        self.mips
    }

    pub fn ram(&self) -> u32 {
        self.ram
    }

    pub fn up_bw(&self) -> u64 {
        self.up_bw
    }

    pub fn down_bw(&self) -> u64 {
        self.down_bw
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rate_per_mips(&self) -> f64 {
        self.rate_per_mips
    }

    pub fn busy_power(&self) -> f64 {
        self.busy_power
    }

    pub fn idle_power(&self) -> f64 {
        self.idle_power
    }

    pub fn uplink_latency(&self) -> f64 {
        self.uplink_latency
    }

    pub fn parent(&self) -> Option<DeviceId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Tier implied by the level, if it is one of the three standard tiers
    pub fn class(&self) -> Option<DeviceClass> {
        DeviceClass::from_level(self.level)
    }
}
