//! The smart-agriculture application graph.
//!
//! ```text
//! ENV_SENSOR -> preprocessing -> analytics -> IRRIGATION_CTRL
//!                                          \-> storage
//! ```
//!
//! Preprocessing filters raw readings at the gateway, analytics decides on
//! irrigation at the farm server, storage keeps long-term data in the cloud.

use serde::{Deserialize, Serialize};

use super::builder::{Application, ApplicationBuilder};
use super::error::GraphError;
use super::types::{Direction, EdgeKind, EdgeSpec, Selectivity};

pub const PREPROCESSING: &str = "preprocessing";
pub const ANALYTICS: &str = "analytics";
pub const STORAGE: &str = "storage";

pub const FILTERED_DATA: &str = "FILTERED_DATA";
pub const IRRIGATION_COMMAND: &str = "IRR_CMD";
pub const STORE_DATA: &str = "STORE_DATA";

/// RAM reserved by each module
const MODULE_RAM: u32 = 10;

/// Tunable selectivities of the analytics stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSelectivity {
    /// Probability a filtered reading triggers an irrigation command;
    /// below 1.0 gives sparse actuation
    pub irrigation: f64,
    /// Probability a filtered reading is archived in the cloud
    pub storage: f64,
}

impl Default for AnalyticsSelectivity {
    fn default() -> Self {
        AnalyticsSelectivity {
            irrigation: 1.0,
            storage: 1.0,
        }
    }
}

/// Declare the smart-agriculture graph for the given endpoint types.
///
/// The control loop `sensor -> preprocessing -> analytics -> actuator` is
/// registered for latency tracking.
pub fn smart_agri_application(
    app_id: &str,
    user_id: u32,
    sensor_type: &str,
    actuator_type: &str,
    selectivity: &AnalyticsSelectivity,
) -> Result<Application, GraphError> {
    let mut app = ApplicationBuilder::new(app_id, user_id);

    app.add_module(PREPROCESSING, MODULE_RAM) // gateways
        .add_module(ANALYTICS, MODULE_RAM) // farm fog servers
        .add_module(STORAGE, MODULE_RAM); // cloud

    app.add_edge(
        EdgeSpec::new(sensor_type, PREPROCESSING, sensor_type, Direction::Up, EdgeKind::Sensor)
            .with_costs(500.0, 2000.0),
    )
    .add_edge(
        EdgeSpec::new(PREPROCESSING, ANALYTICS, FILTERED_DATA, Direction::Up, EdgeKind::Module)
            .with_costs(800.0, 1000.0),
    )
    .add_edge(
        EdgeSpec::new(ANALYTICS, actuator_type, IRRIGATION_COMMAND, Direction::Down, EdgeKind::Actuator)
            .with_periodicity(100.0)
            .with_costs(50.0, 1000.0),
    )
    .add_edge(
        EdgeSpec::new(ANALYTICS, STORAGE, STORE_DATA, Direction::Up, EdgeKind::Module)
            .with_costs(200.0, 4000.0),
    );

    app.add_tuple_mapping(PREPROCESSING, sensor_type, FILTERED_DATA, Selectivity::always())
        .add_tuple_mapping(
            ANALYTICS,
            FILTERED_DATA,
            IRRIGATION_COMMAND,
            Selectivity::Fractional(selectivity.irrigation),
        )
        .add_tuple_mapping(
            ANALYTICS,
            FILTERED_DATA,
            STORE_DATA,
            Selectivity::Fractional(selectivity.storage),
        );

    app.add_loop([sensor_type, PREPROCESSING, ANALYTICS, actuator_type]);

    app.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_app() -> Application {
        smart_agri_application("smart_agri", 1, "ENV_SENSOR", "IRRIGATION_CTRL", &AnalyticsSelectivity::default())
            .unwrap()
    }

    #[test]
    fn test_graph_shape() {
        let app = default_app();
        let modules: Vec<_> = app.modules().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(modules, vec![PREPROCESSING, ANALYTICS, STORAGE]);
        assert_eq!(app.edges().len(), 4);

        let actuation = app.edges_from(ANALYTICS).find(|e| e.kind == EdgeKind::Actuator).unwrap();
        assert_eq!(actuation.destination, "IRRIGATION_CTRL");
        assert_eq!(actuation.direction, Direction::Down);
        assert_eq!(actuation.periodicity, Some(100.0));
        assert_eq!(actuation.tuple_cpu_length, 50.0);
        assert_eq!(actuation.tuple_nw_length, 1000.0);

        let sensing = app.edges_into(PREPROCESSING).next().unwrap();
        assert_eq!(sensing.kind, EdgeKind::Sensor);
        assert_eq!(sensing.tuple_type, "ENV_SENSOR");
        assert_eq!(sensing.periodicity, None);
    }

    #[test]
    fn test_control_loop_probabilities_are_deterministic() {
        let app = default_app();
        for mapping in app.tuple_mappings() {
            assert_eq!(mapping.selectivity.probability(), 1.0);
        }
        assert_eq!(app.mappings_for(ANALYTICS, FILTERED_DATA).count(), 2);
    }

    #[test]
    fn test_control_loop_declared() {
        let app = default_app();
        assert_eq!(app.loops().len(), 1);
        let control = &app.loops()[0];
        assert_eq!(
            control.modules(),
            &["ENV_SENSOR", PREPROCESSING, ANALYTICS, "IRRIGATION_CTRL"]
        );
        for (from, to) in control.steps() {
            assert_eq!(app.edges().iter().filter(|e| e.connects(from, to)).count(), 1);
        }
    }

    #[test]
    fn test_sparse_actuation() {
        let selectivity = AnalyticsSelectivity {
            irrigation: 0.25,
            storage: 1.0,
        };
        let app = smart_agri_application("smart_agri", 1, "ENV_SENSOR", "IRRIGATION_CTRL", &selectivity).unwrap();
        let irrigation = app
            .tuple_mappings()
            .iter()
            .find(|m| m.output_type == IRRIGATION_COMMAND)
            .unwrap();
        assert_eq!(irrigation.selectivity.probability(), 0.25);
    }

    #[test]
    fn test_invalid_selectivity_rejected() {
        let selectivity = AnalyticsSelectivity {
            irrigation: 2.0,
            storage: 1.0,
        };
        assert!(smart_agri_application("smart_agri", 1, "ENV_SENSOR", "IRRIGATION_CTRL", &selectivity).is_err());
    }
}
