//! Wires the smart-agriculture scenario together.
//!
//! Order: broker identity, application graph, topology, endpoint
//! cross-check, module mapping, placement resolution. Any failure aborts the
//! whole assembly and nothing is handed to the engine.

use color_eyre::eyre::{eyre, WrapErr};
use log::{info, warn};
use serde::Serialize;

use crate::application::smart_agri::{ANALYTICS, PREPROCESSING, STORAGE};
use crate::application::{smart_agri_application, Application};
use crate::config::ScenarioConfig;
use crate::error::ScenarioError;
use crate::placement::{
    ModuleMapping, PlacementError, PlacementMode, PlacementPolicy, PlacementRequest, ResolvedPlacement,
    StaticPlacement,
};
use crate::topology::{is_gateway_name, Topology, TopologyBuilder, CLOUD_NAME};

use super::context::ScenarioContext;

/// A fully assembled, immutable scenario
#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    app_id: String,
    user_id: u32,
    mode: PlacementMode,
    topology: Topology,
    application: Application,
    mapping: ModuleMapping,
    placement: ResolvedPlacement,
}

impl Scenario {
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn mapping(&self) -> &ModuleMapping {
        &self.mapping
    }

    /// Static part of the placement; modules left to the dynamic policy are
    /// listed as unresolved
    pub fn placement(&self) -> &ResolvedPlacement {
        &self.placement
    }

    pub fn placement_request(&self) -> PlacementRequest<'_> {
        PlacementRequest {
            topology: &self.topology,
            application: &self.application,
            mapping: &self.mapping,
        }
    }

    /// Hand the scenario to a simulation engine.
    ///
    /// In static mode the mapping is resolved directly. In edge-ward mode
    /// `dynamic` must be supplied and decides the modules the mapping leaves
    /// open.
    pub fn submit(
        &self,
        engine: &mut dyn SimulationEngine,
        dynamic: Option<&dyn PlacementPolicy>,
    ) -> color_eyre::Result<()> {
        let request = self.placement_request();
        let placement = match self.mode {
            PlacementMode::Static => StaticPlacement.place(&request)?,
            PlacementMode::Edgewards => {
                let policy = dynamic.ok_or_else(|| eyre!("Edge-ward placement requires a dynamic placement policy"))?;
                info!("Placing modules with the '{}' policy", policy.name());
                policy
                    .place(&request)
                    .wrap_err_with(|| format!("Placement policy '{}' failed", policy.name()))?
            }
        };

        if !placement.is_complete() {
            return Err(PlacementError::Unresolved(placement.unresolved).into());
        }

        info!(
            "Submitting application '{}' for user {} ({} devices, {} modules placed)",
            self.app_id,
            self.user_id,
            self.topology.devices().len(),
            placement.assignments.len()
        );
        engine
            .submit(Submission {
                user_id: self.user_id,
                topology: &self.topology,
                application: &self.application,
                placement,
            })
            .wrap_err("Simulation engine rejected the scenario")
    }
}

/// Everything the engine receives for one application
#[derive(Debug)]
pub struct Submission<'a> {
    pub user_id: u32,
    pub topology: &'a Topology,
    pub application: &'a Application,
    pub placement: ResolvedPlacement,
}

/// The discrete-event engine that runs a submitted scenario
pub trait SimulationEngine {
    fn submit(&mut self, submission: Submission<'_>) -> color_eyre::Result<()>;
}

/// Assemble a scenario with a fresh construction context
pub fn assemble(config: &ScenarioConfig) -> Result<Scenario, ScenarioError> {
    let ctx = ScenarioContext::new();
    assemble_with(&ctx, config)
}

/// Assemble a scenario drawing identities from `ctx`
pub fn assemble_with(ctx: &ScenarioContext, config: &ScenarioConfig) -> Result<Scenario, ScenarioError> {
    let general = &config.general;
    let profiles = &config.topology.profiles;
    let mode = PlacementMode::from_cloud_only(general.cloud_only);
    info!("Assembling scenario '{}' in {:?} placement mode", general.app_id, mode);

    let user_id = ctx.allocate_user_id()?;

    let application = smart_agri_application(
        &general.app_id,
        user_id,
        &profiles.sensor_type,
        &profiles.actuator_type,
        &config.application.selectivity,
    )?;

    let params = config.topology.params();
    let builder = TopologyBuilder::new(&params, profiles, user_id, &general.app_id);
    let topology = if config.topology.parallel {
        builder.build_parallel(ctx.ids())?
    } else {
        builder.build(ctx.ids())?
    };

    check_endpoint_types(&topology, &application)?;

    let mapping = build_module_mapping(&topology, general.cloud_only);
    let placement = mapping.resolve(&topology, &application)?;
    if mode == PlacementMode::Static && !placement.is_complete() {
        return Err(PlacementError::Unresolved(placement.unresolved).into());
    }

    Ok(Scenario {
        app_id: general.app_id.clone(),
        user_id,
        mode,
        topology,
        application,
        mapping,
        placement,
    })
}

/// Placement hints of the smart-agriculture scenario.
///
/// Storage always runs in the cloud. Cloud-only mode pins the two processing
/// stages there too; otherwise preprocessing runs on every gateway and
/// analytics is left to the edge-ward policy.
pub fn build_module_mapping(topology: &Topology, cloud_only: bool) -> ModuleMapping {
    let mut mapping = ModuleMapping::new();
    mapping.add_module_to_device(STORAGE, CLOUD_NAME);

    if cloud_only {
        mapping.add_module_to_device(PREPROCESSING, CLOUD_NAME);
        mapping.add_module_to_device(ANALYTICS, CLOUD_NAME);
        return mapping;
    }

    let gateways: Vec<&str> = topology
        .devices()
        .iter()
        .map(|d| d.name())
        .filter(|name| is_gateway_name(name))
        .collect();
    if gateways.is_empty() {
        warn!("No gateways in the topology; '{}' is left to the dynamic policy", PREPROCESSING);
    } else {
        mapping.add_module_to_devices(PREPROCESSING, gateways);
    }
    mapping
}

/// Every endpoint type in the topology must be wired into the graph
fn check_endpoint_types(topology: &Topology, application: &Application) -> Result<(), ScenarioError> {
    for sensor_type in topology.sensor_types() {
        if !application.sensor_types().contains(sensor_type) {
            return Err(ScenarioError::UnmatchedSensorType(sensor_type.to_string()));
        }
    }
    for actuator_type in topology.actuator_types() {
        if !application.actuator_types().contains(actuator_type) {
            return Err(ScenarioError::UnmatchedActuatorType(actuator_type.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationBuilder, Direction, EdgeKind, EdgeSpec};
    use crate::ids::IdGenerator;
    use crate::topology::{TopologyParams, TopologyProfiles};

    #[derive(Default)]
    struct RecordingEngine {
        submissions: Vec<ResolvedPlacement>,
    }

    impl SimulationEngine for RecordingEngine {
        fn submit(&mut self, submission: Submission<'_>) -> color_eyre::Result<()> {
            self.submissions.push(submission.placement);
            Ok(())
        }
    }

    /// Places unpinned modules on the farm servers
    struct FarmServerPolicy;

    impl PlacementPolicy for FarmServerPolicy {
        fn name(&self) -> &str {
            "farm-server"
        }

        fn place(&self, request: &PlacementRequest<'_>) -> Result<ResolvedPlacement, PlacementError> {
            let mut resolved = request.mapping.resolve(request.topology, request.application)?;
            let servers: Vec<_> = request.topology.devices_at_level(1).map(|d| d.id()).collect();
            for module in std::mem::take(&mut resolved.unresolved) {
                resolved.assignments.insert(module, servers.clone());
            }
            Ok(resolved)
        }
    }

    /// Returns the static resolution untouched, leaving open modules open
    struct PassThroughPolicy;

    impl PlacementPolicy for PassThroughPolicy {
        fn name(&self) -> &str {
            "pass-through"
        }

        fn place(&self, request: &PlacementRequest<'_>) -> Result<ResolvedPlacement, PlacementError> {
            request.mapping.resolve(request.topology, request.application)
        }
    }

    fn cloud_only_config() -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.general.cloud_only = true;
        config
    }

    #[test]
    fn test_cloud_only_mapping() {
        let scenario = assemble(&cloud_only_config()).unwrap();
        assert_eq!(scenario.mode(), PlacementMode::Static);
        assert!(scenario.placement().is_complete());

        let cloud = scenario.topology().root().unwrap().id();
        for module in [PREPROCESSING, ANALYTICS, STORAGE] {
            assert_eq!(scenario.placement().devices_for(module), &[cloud]);
        }
    }

    #[test]
    fn test_edgewards_mapping() {
        let scenario = assemble(&ScenarioConfig::default()).unwrap();
        assert_eq!(scenario.mode(), PlacementMode::Edgewards);
        assert_eq!(scenario.placement().unresolved, vec![ANALYTICS.to_string()]);

        let gateways: Vec<_> = scenario.topology().gateways().map(|d| d.id()).collect();
        assert_eq!(gateways.len(), 4);
        assert_eq!(scenario.placement().devices_for(PREPROCESSING), gateways.as_slice());
        assert_eq!(scenario.mapping().len(), 2);
    }

    #[test]
    fn test_edgewards_without_gateways() {
        let mut config = ScenarioConfig::default();
        config.topology.farms = 0;
        let scenario = assemble(&config).unwrap();
        assert_eq!(scenario.topology().devices().len(), 1);
        assert!(scenario.mapping().target(PREPROCESSING).is_none());
        assert_eq!(scenario.placement().unresolved, vec![PREPROCESSING, ANALYTICS]);
    }

    #[test]
    fn test_identities_are_disjoint() {
        let scenario = assemble(&ScenarioConfig::default()).unwrap();
        assert!(scenario
            .topology()
            .devices()
            .iter()
            .all(|d| d.id().0 != scenario.user_id()));
    }

    #[test]
    fn test_context_is_consumed_on_failure() {
        let ctx = ScenarioContext::with_generator(IdGenerator::starting_at(u32::MAX - 3));
        let err = assemble_with(&ctx, &ScenarioConfig::default()).unwrap_err();
        assert!(matches!(err, ScenarioError::IdsExhausted));
    }

    #[test]
    fn test_invalid_topology_aborts() {
        let mut config = ScenarioConfig::default();
        config.topology.gateways_per_farm = 0;
        assert!(matches!(
            assemble(&config),
            Err(ScenarioError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_unmatched_sensor_type() {
        let params = TopologyParams::default();
        let mut profiles = TopologyProfiles::default();
        profiles.sensor_type = "SOIL_PROBE".to_string();
        let topology = TopologyBuilder::new(&params, &profiles, 1, "smart_agri")
            .build(&IdGenerator::new())
            .unwrap();
        let app = smart_agri_application("smart_agri", 1, "ENV_SENSOR", "IRRIGATION_CTRL", &Default::default())
            .unwrap();

        assert!(matches!(
            check_endpoint_types(&topology, &app),
            Err(ScenarioError::UnmatchedSensorType(t)) if t == "SOIL_PROBE"
        ));
    }

    #[test]
    fn test_unmatched_actuator_type() {
        let params = TopologyParams::default();
        let profiles = TopologyProfiles::default();
        let topology = TopologyBuilder::new(&params, &profiles, 1, "smart_agri")
            .build(&IdGenerator::new())
            .unwrap();

        let mut builder = ApplicationBuilder::new("smart_agri", 1);
        builder.add_module("sink", 10).add_edge(EdgeSpec::new(
            "ENV_SENSOR",
            "sink",
            "ENV_SENSOR",
            Direction::Up,
            EdgeKind::Sensor,
        ));
        let app = builder.build().unwrap();

        assert!(matches!(
            check_endpoint_types(&topology, &app),
            Err(ScenarioError::UnmatchedActuatorType(_))
        ));
    }

    #[test]
    fn test_submit_static() {
        let scenario = assemble(&cloud_only_config()).unwrap();
        let mut engine = RecordingEngine::default();
        scenario.submit(&mut engine, None).unwrap();
        assert_eq!(engine.submissions.len(), 1);
        assert_eq!(engine.submissions[0].assignments.len(), 3);
    }

    #[test]
    fn test_submit_edgewards_requires_policy() {
        let scenario = assemble(&ScenarioConfig::default()).unwrap();
        let mut engine = RecordingEngine::default();
        assert!(scenario.submit(&mut engine, None).is_err());
        assert!(engine.submissions.is_empty());

        scenario.submit(&mut engine, Some(&FarmServerPolicy)).unwrap();
        let placement = &engine.submissions[0];
        assert!(placement.is_complete());
        assert_eq!(placement.devices_for(ANALYTICS).len(), 2);
        assert_eq!(placement.devices_for(PREPROCESSING).len(), 4);
    }

    #[test]
    fn test_submit_rejects_incomplete_dynamic_placement() {
        let scenario = assemble(&ScenarioConfig::default()).unwrap();
        let mut engine = RecordingEngine::default();

        let err = scenario.submit(&mut engine, Some(&PassThroughPolicy)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PlacementError>(),
            Some(&PlacementError::Unresolved(vec![ANALYTICS.to_string()]))
        );
        assert!(engine.submissions.is_empty());
    }
}
