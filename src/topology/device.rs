//! Fog device factory.

use log::debug;

use crate::error::ScenarioError;
use crate::ids::IdGenerator;
use crate::utils::validation::validate_name;

use super::types::{DeviceId, DeviceSpec, FogDevice};

/// Build one device with a fresh identity and no parent.
///
/// The profile is validated before an identity is drawn, so a rejected device
/// never consumes one. An exhausted generator is fatal.
pub fn create_fog_device(
    name: impl Into<String>,
    spec: &DeviceSpec,
    ids: &IdGenerator,
) -> Result<FogDevice, ScenarioError> {
    let name = name.into();
    validate_name(&name).map_err(|e| ScenarioError::invalid("device.name", e))?;
    spec.validate(&name)?;

    let id = DeviceId(ids.next_id()?);
    debug!(
        "Created device {} (id {}, level {}, {} MIPS, {} RAM)",
        name, id, spec.level, spec.mips, spec.ram
    );
    Ok(FogDevice::new(id, name, spec))
}
