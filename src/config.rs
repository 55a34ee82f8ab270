//! Scenario configuration.
//!
//! Every section and field has a default matching the reference
//! smart-agriculture scenario, so an empty YAML document is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use crate::application::AnalyticsSelectivity;
use crate::topology::{Distribution, TopologyParams, TopologyProfiles};
use crate::utils::validation::{validate_log_level, validate_name};

/// Top-level configuration that mirrors the YAML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub general: GeneralConfig,
    pub topology: TopologyConfig,
    pub application: ApplicationConfig,
}

impl ScenarioConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.general.app_id)
            .map_err(|e| ValidationError::InvalidGeneral(format!("app_id: {}", e)))?;

        if let Some(level) = &self.general.log_level {
            validate_log_level(level).map_err(|e| ValidationError::InvalidGeneral(format!("log_level: {}", e)))?;
        }

        self.topology
            .params()
            .validate()
            .map_err(|e| ValidationError::InvalidTopology(e.to_string()))?;
        self.topology
            .profiles
            .validate()
            .map_err(|e| ValidationError::InvalidTopology(e.to_string()))?;

        let selectivity = &self.application.selectivity;
        for (field, value) in [("irrigation", selectivity.irrigation), ("storage", selectivity.storage)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidApplication(format!(
                    "selectivity.{} must be within [0, 1], got {}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.general
    }
}

/// General scenario settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Application identifier shared by sensors, actuators and the graph
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Pin every module to the cloud instead of placing them edge-ward
    pub cloud_only: bool,
    /// Seed for synthetic telemetry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_id: "smart_agri".to_string(),
            log_level: Some("info".to_string()),
            cloud_only: false,
            seed: None,
        }
    }
}

/// Sensing interval, either a bare number of time units or a distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalSetting {
    Fixed(f64),
    Distribution(Distribution),
}

impl IntervalSetting {
    pub fn to_distribution(&self) -> Distribution {
        match self {
            IntervalSetting::Fixed(value) => Distribution::deterministic(*value),
            IntervalSetting::Distribution(d) => d.clone(),
        }
    }
}

impl Default for IntervalSetting {
    fn default() -> Self {
        IntervalSetting::Fixed(5.0)
    }
}

/// Shape of the fog hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub farms: usize,
    pub gateways_per_farm: usize,
    pub sensors_per_gateway: usize,
    pub sensing_interval: IntervalSetting,
    /// Build farms on the rayon pool
    pub parallel: bool,
    pub profiles: TopologyProfiles,
}

impl TopologyConfig {
    pub fn params(&self) -> TopologyParams {
        TopologyParams {
            farms: self.farms,
            gateways_per_farm: self.gateways_per_farm,
            sensors_per_gateway: self.sensors_per_gateway,
            sensing_interval: self.sensing_interval.to_distribution(),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        let params = TopologyParams::default();
        Self {
            farms: params.farms,
            gateways_per_farm: params.gateways_per_farm,
            sensors_per_gateway: params.sensors_per_gateway,
            sensing_interval: IntervalSetting::default(),
            parallel: false,
            profiles: TopologyProfiles::default(),
        }
    }
}

/// Application graph settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub selectivity: AnalyticsSelectivity,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid application configuration: {0}")]
    InvalidApplication(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_reference_scenario() {
        let config: ScenarioConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.general.app_id, "smart_agri");
        assert!(!config.general.cloud_only);

        let params = config.topology.params();
        assert_eq!((params.farms, params.gateways_per_farm, params.sensors_per_gateway), (2, 2, 10));
        assert_eq!(params.sensing_interval, Distribution::deterministic(5.0));
    }

    #[test]
    fn test_full_config_parsing() {
        let yaml = r#"
general:
  app_id: orchard
  log_level: debug
  cloud_only: true
  seed: 42
topology:
  farms: 3
  gateways_per_farm: 4
  sensors_per_gateway: 6
  sensing_interval:
    type: normal
    mean: 5.0
    stdev: 1.0
  parallel: true
  profiles:
    gateway_uplink_latency: 12.5
    gateway:
      mips: 2400
      ram: 2000
      up_bw: 10000
      down_bw: 10000
      level: 2
      rate_per_mips: 0.0
      busy_power: 87.53
      idle_power: 82.44
application:
  selectivity:
    irrigation: 0.3
"#;
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.seed, Some(42));
        assert!(config.topology.parallel);
        assert_eq!(config.topology.profiles.gateway.mips, 2400);
        assert_eq!(config.topology.profiles.gateway_uplink_latency, 12.5);
        assert_eq!(config.topology.profiles.farm_uplink_latency, 80.0);
        assert_eq!(config.application.selectivity.irrigation, 0.3);
        assert_eq!(config.application.selectivity.storage, 1.0);
        assert_eq!(
            config.topology.params().sensing_interval,
            Distribution::Normal { mean: 5.0, stdev: 1.0 }
        );
    }

    #[test]
    fn test_fixed_interval_shorthand() {
        let config: ScenarioConfig = serde_yaml::from_str("topology:\n  sensing_interval: 2.5\n").unwrap();
        assert_eq!(config.topology.sensing_interval, IntervalSetting::Fixed(2.5));
        assert_eq!(config.topology.params().sensing_interval.mean_interval(), 2.5);
    }

    #[test]
    fn test_negative_count_fails_to_parse() {
        let result: Result<ScenarioConfig, _> = serde_yaml::from_str("topology:\n  farms: -1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ScenarioConfig::default();
        config.topology.gateways_per_farm = 0;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTopology(_))));

        let mut config = ScenarioConfig::default();
        config.topology.sensing_interval = IntervalSetting::Fixed(0.0);
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTopology(_))));

        let mut config = ScenarioConfig::default();
        config.general.log_level = Some("loud".to_string());
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));

        let mut config = ScenarioConfig::default();
        config.general.app_id = String::new();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidGeneral(_))));

        let mut config = ScenarioConfig::default();
        config.application.selectivity.irrigation = 1.5;
        assert!(matches!(config.validate(), Err(ValidationError::InvalidApplication(_))));
    }

    #[test]
    fn test_zero_farms_is_valid() {
        let mut config = ScenarioConfig::default();
        config.topology.farms = 0;
        config.topology.gateways_per_farm = 0;
        assert!(config.validate().is_ok());
    }
}
