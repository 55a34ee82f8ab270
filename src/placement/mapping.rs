//! Module placement hints.
//!
//! A [`ModuleMapping`] records where modules should run, by device name or by
//! hierarchy tier. It performs no validation when written; a second
//! assignment for the same module replaces the first, so a generic default
//! can be followed by a specific override. References are checked when the
//! mapping is resolved against a topology and an application.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::topology::{DeviceClass, DeviceId, Topology};

use super::PlacementError;

/// Where a module should be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum PlacementTarget {
    /// One named device
    Device(String),
    /// Every listed device runs an instance
    Devices(Vec<String>),
    /// Every device of a tier runs an instance
    Class(DeviceClass),
}

/// Table from module name to placement target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModuleMapping {
    entries: BTreeMap<String, PlacementTarget>,
}

impl ModuleMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module_to_device(&mut self, module: impl Into<String>, device: impl Into<String>) {
        self.assign(module.into(), PlacementTarget::Device(device.into()));
    }

    pub fn add_module_to_devices<I, S>(&mut self, module: impl Into<String>, devices: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let devices = devices.into_iter().map(Into::into).collect();
        self.assign(module.into(), PlacementTarget::Devices(devices));
    }

    pub fn add_module_to_class(&mut self, module: impl Into<String>, class: DeviceClass) {
        self.assign(module.into(), PlacementTarget::Class(class));
    }

    fn assign(&mut self, module: String, target: PlacementTarget) {
        debug!("Placement hint: {} -> {:?}", module, target);
        if let Some(previous) = self.entries.insert(module.clone(), target) {
            debug!("Placement of '{}' overrides earlier hint {:?}", module, previous);
        }
    }

    pub fn target(&self, module: &str) -> Option<&PlacementTarget> {
        self.entries.get(module)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.entries.contains_key(module)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &PlacementTarget)> {
        self.entries.iter().map(|(m, t)| (m.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every hint to concrete devices.
    ///
    /// Fails on hints naming modules absent from the application or devices
    /// absent from the topology. Modules used by edges but without a hint
    /// are listed in [`ResolvedPlacement::unresolved`] for a dynamic policy.
    pub fn resolve(&self, topology: &Topology, application: &Application) -> Result<ResolvedPlacement, PlacementError> {
        let mut assignments = BTreeMap::new();

        for (module, target) in &self.entries {
            if !application.has_module(module) {
                return Err(PlacementError::UnknownModule(module.clone()));
            }

            let devices = match target {
                PlacementTarget::Device(name) => vec![lookup(topology, module, name)?],
                PlacementTarget::Devices(names) => {
                    if names.is_empty() {
                        return Err(PlacementError::EmptyTarget(module.clone()));
                    }
                    names
                        .iter()
                        .map(|name| lookup(topology, module, name))
                        .collect::<Result<Vec<_>, _>>()?
                }
                PlacementTarget::Class(class) => {
                    let devices: Vec<DeviceId> = topology.devices_at_level(class.level()).map(|d| d.id()).collect();
                    if devices.is_empty() {
                        return Err(PlacementError::EmptyClass {
                            module: module.clone(),
                            class: *class,
                        });
                    }
                    devices
                }
            };
            assignments.insert(module.clone(), devices);
        }

        let unresolved: Vec<String> = application
            .referenced_modules()
            .into_iter()
            .filter(|m| !assignments.contains_key(*m))
            .map(str::to_string)
            .collect();

        info!(
            "Resolved placement for {} modules ({} left to the dynamic policy)",
            assignments.len(),
            unresolved.len()
        );
        Ok(ResolvedPlacement { assignments, unresolved })
    }
}

fn lookup(topology: &Topology, module: &str, device: &str) -> Result<DeviceId, PlacementError> {
    topology
        .device_by_name(device)
        .map(|d| d.id())
        .ok_or_else(|| PlacementError::UnknownDevice {
            module: module.to_string(),
            device: device.to_string(),
        })
}

/// Module to device assignment handed to the simulation engine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedPlacement {
    /// Devices that run an instance of each module
    pub assignments: BTreeMap<String, Vec<DeviceId>>,
    /// Modules referenced by edges that still need a device
    pub unresolved: Vec<String>,
}

impl ResolvedPlacement {
    pub fn devices_for(&self, module: &str) -> &[DeviceId] {
        self.assignments.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{smart_agri_application, AnalyticsSelectivity};
    use crate::ids::IdGenerator;
    use crate::topology::{TopologyBuilder, TopologyParams, TopologyProfiles};

    fn fixtures() -> (Topology, Application) {
        let params = TopologyParams::default();
        let profiles = TopologyProfiles::default();
        let topology = TopologyBuilder::new(&params, &profiles, 1, "smart_agri")
            .build(&IdGenerator::new())
            .unwrap();
        let app = smart_agri_application("smart_agri", 1, "ENV_SENSOR", "IRRIGATION_CTRL", &AnalyticsSelectivity::default())
            .unwrap();
        (topology, app)
    }

    #[test]
    fn test_last_write_wins() {
        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_class("analytics", DeviceClass::FarmServer);
        mapping.add_module_to_device("analytics", "cloud");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.target("analytics"), Some(&PlacementTarget::Device("cloud".to_string())));
    }

    #[test]
    fn test_no_validation_on_write() {
        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_device("ghost", "nowhere");
        assert!(mapping.contains("ghost"));
    }

    #[test]
    fn test_resolve_names_and_classes() {
        let (topology, app) = fixtures();
        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_device("storage", "cloud");
        mapping.add_module_to_devices("preprocessing", ["gw-0-0", "gw-1-1"]);
        mapping.add_module_to_class("analytics", DeviceClass::FarmServer);

        let resolved = mapping.resolve(&topology, &app).unwrap();
        assert!(resolved.is_complete());

        let cloud = topology.device_by_name("cloud").unwrap().id();
        assert_eq!(resolved.devices_for("storage"), &[cloud]);
        assert_eq!(resolved.devices_for("preprocessing").len(), 2);
        assert_eq!(resolved.devices_for("analytics").len(), 2);
        for id in resolved.devices_for("analytics") {
            assert_eq!(topology.device(*id).unwrap().level(), 1);
        }
    }

    #[test]
    fn test_unmapped_modules_reported() {
        let (topology, app) = fixtures();
        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_device("storage", "cloud");

        let resolved = mapping.resolve(&topology, &app).unwrap();
        assert_eq!(resolved.unresolved, vec!["preprocessing", "analytics"]);
        assert!(resolved.devices_for("analytics").is_empty());
    }

    #[test]
    fn test_dangling_references_rejected() {
        let (topology, app) = fixtures();

        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_device("ghost", "cloud");
        assert_eq!(
            mapping.resolve(&topology, &app).unwrap_err(),
            PlacementError::UnknownModule("ghost".to_string())
        );

        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_device("storage", "mars");
        assert!(matches!(
            mapping.resolve(&topology, &app),
            Err(PlacementError::UnknownDevice { .. })
        ));

        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_devices("preprocessing", Vec::<String>::new());
        assert!(matches!(mapping.resolve(&topology, &app), Err(PlacementError::EmptyTarget(_))));
    }

    #[test]
    fn test_empty_class_rejected() {
        let params = TopologyParams {
            farms: 0,
            ..TopologyParams::default()
        };
        let profiles = TopologyProfiles::default();
        let topology = TopologyBuilder::new(&params, &profiles, 1, "smart_agri")
            .build(&IdGenerator::new())
            .unwrap();
        let (_, app) = fixtures();

        let mut mapping = ModuleMapping::new();
        mapping.add_module_to_class("preprocessing", DeviceClass::Gateway);
        assert!(matches!(
            mapping.resolve(&topology, &app),
            Err(PlacementError::EmptyClass { class: DeviceClass::Gateway, .. })
        ));
    }
}
