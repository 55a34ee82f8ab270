use crate::config::ScenarioConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a scenario configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<ScenarioConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: ScenarioConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    info!(
        "Configuration: {} farms x {} gateways x {} sensors, cloud_only={}",
        config.topology.farms,
        config.topology.gateways_per_farm,
        config.topology.sensors_per_gateway,
        config.general.cloud_only
    );

    Ok(config)
}

/// Read only the configured log level, before logging is set up.
///
/// Any failure yields `None`; `load_config` reports it once the logger runs.
pub fn peek_log_level(config_path: &Path) -> Option<String> {
    let file = File::open(config_path).ok()?;
    let config: ScenarioConfig = serde_yaml::from_reader(file).ok()?;
    config.general.log_level
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub cloud_only: bool,
    pub farms: Option<usize>,
    pub gateways_per_farm: Option<usize>,
    pub sensors_per_gateway: Option<usize>,
    pub seed: Option<u64>,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut ScenarioConfig, overrides: &ScenarioOverrides) -> Result<()> {
    if overrides.cloud_only {
        info!("Cloud-only placement forced from the command line");
        config.general.cloud_only = true;
    }

    if let Some(farms) = overrides.farms {
        info!("Overriding farm count: {} -> {}", config.topology.farms, farms);
        config.topology.farms = farms;
    }

    if let Some(gateways) = overrides.gateways_per_farm {
        info!(
            "Overriding gateways per farm: {} -> {}",
            config.topology.gateways_per_farm, gateways
        );
        config.topology.gateways_per_farm = gateways;
    }

    if let Some(sensors) = overrides.sensors_per_gateway {
        info!(
            "Overriding sensors per gateway: {} -> {}",
            config.topology.sensors_per_gateway, sensors
        );
        config.topology.sensors_per_gateway = sensors;
    }

    if let Some(seed) = overrides.seed {
        config.general.seed = Some(seed);
    }

    config.validate()?;

    Ok(())
}
