use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use log::info;

use crate::scenario::Scenario;
use crate::telemetry::TelemetryEvent;

use super::registry::DeviceRegistry;

pub const SCENARIO_FILE: &str = "scenario.yaml";
pub const REGISTRY_FILE: &str = "device_registry.json";
pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Paths written by [`write_scenario`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub scenario: PathBuf,
    pub registry: PathBuf,
}

/// Write the scenario description and the device registry into `output_dir`
pub fn write_scenario(scenario: &Scenario, output_dir: &Path) -> Result<ExportedFiles> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let scenario_path = output_dir.join(SCENARIO_FILE);
    let scenario_yaml = serde_yaml::to_string(scenario).context("Failed to serialize scenario to YAML")?;
    fs::write(&scenario_path, scenario_yaml)
        .with_context(|| format!("Failed to write scenario to {}", scenario_path.display()))?;
    info!("Scenario written to {}", scenario_path.display());

    let registry_path = output_dir.join(REGISTRY_FILE);
    let registry = DeviceRegistry::from_scenario(scenario);
    let registry_json = serde_json::to_string_pretty(&registry).context("Failed to serialize device registry")?;
    fs::write(&registry_path, registry_json)
        .with_context(|| format!("Failed to write device registry to {}", registry_path.display()))?;
    info!("Device registry written to {}", registry_path.display());

    Ok(ExportedFiles {
        scenario: scenario_path,
        registry: registry_path,
    })
}

/// Write telemetry events as JSON lines
pub fn write_telemetry(events: &[TelemetryEvent], path: &Path) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event).context("Failed to serialize telemetry event")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!("{} telemetry events written to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::scenario::assemble;
    use crate::telemetry::{sample_telemetry, TelemetryOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_write_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = assemble(&ScenarioConfig::default()).unwrap();

        let files = write_scenario(&scenario, &dir.path().join("out")).unwrap();
        assert!(files.scenario.exists());

        let yaml: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&files.scenario).unwrap()).unwrap();
        assert_eq!(yaml["app_id"].as_str(), Some("smart_agri"));
        assert_eq!(yaml["mode"].as_str(), Some("edgewards"));
        assert_eq!(yaml["topology"]["devices"].as_sequence().map(|s| s.len()), Some(7));
        assert_eq!(yaml["mapping"]["storage"]["target"].as_str(), Some("cloud"));

        let registry: DeviceRegistry = serde_json::from_str(&fs::read_to_string(&files.registry).unwrap()).unwrap();
        assert_eq!(registry, DeviceRegistry::from_scenario(&scenario));
    }

    #[test]
    fn test_write_telemetry_lines() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = assemble(&ScenarioConfig::default()).unwrap();
        let options = TelemetryOptions {
            irrigation_chance: 0.0,
            ..TelemetryOptions::default()
        };
        let events = sample_telemetry(scenario.topology(), &options, &mut StdRng::seed_from_u64(2));

        let path = dir.path().join(TELEMETRY_FILE);
        write_telemetry(&events, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 160);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["deviceId"], "s-gw-0-0-0");
        assert_eq!(first["sensorType"], "SOIL_MOISTURE");
    }
}
