//! Deterministic naming for devices and endpoints.
//!
//! Names are derived from `(farm, gateway, sensor)` indices only, so two
//! builds with the same parameters produce the same names even though the
//! numeric identities differ. Placement hints refer to devices by these
//! names.

use std::sync::LazyLock;

use regex::Regex;

/// Name of the root device
pub const CLOUD_NAME: &str = "cloud";

/// Matches gateway names produced by [`gateway_name`]
static GATEWAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gw-\d+-\d+$").expect("gateway name pattern is valid"));

/// Farm fog server, e.g. `fog-farm-1`
pub fn farm_server_name(farm: usize) -> String {
    format!("fog-farm-{}", farm)
}

/// Gateway under a farm, e.g. `gw-1-0`
pub fn gateway_name(farm: usize, gateway: usize) -> String {
    format!("gw-{}-{}", farm, gateway)
}

/// Sensor under a gateway, e.g. `s-gw-1-0-7`
pub fn sensor_name(farm: usize, gateway: usize, sensor: usize) -> String {
    format!("s-{}-{}", gateway_name(farm, gateway), sensor)
}

/// Irrigation actuator of a gateway, e.g. `irrig-gw-1-0`
pub fn actuator_name(farm: usize, gateway: usize) -> String {
    format!("irrig-{}", gateway_name(farm, gateway))
}

/// True if `name` follows the gateway naming convention
pub fn is_gateway_name(name: &str) -> bool {
    GATEWAY_PATTERN.is_match(name)
}
