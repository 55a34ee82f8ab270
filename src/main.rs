use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use agrifog::config::ScenarioConfig;
use agrifog::config_loader::{self, ScenarioOverrides};
use agrifog::export::{self, TELEMETRY_FILE};
use agrifog::scenario;
use agrifog::telemetry::{sample_telemetry, TelemetryEvent, TelemetryOptions};

/// Scenario builder for smart-agriculture fog simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario configuration YAML file (defaults to the reference scenario)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the scenario and registry files
    #[arg(short, long, default_value = "agrifog_output")]
    output: PathBuf,

    /// Pin every module to the cloud
    #[arg(long)]
    cloud_only: bool,

    /// Number of farms
    #[arg(long)]
    farms: Option<usize>,

    /// Gateways per farm
    #[arg(long)]
    gateways: Option<usize>,

    /// Sensors per gateway
    #[arg(long)]
    sensors: Option<usize>,

    /// Seed for synthetic telemetry
    #[arg(long)]
    seed: Option<u64>,

    /// Also write this many rounds of synthetic sensor readings
    #[arg(long, value_name = "ROUNDS")]
    sample_readings: Option<usize>,
}

impl Args {
    fn overrides(&self) -> ScenarioOverrides {
        ScenarioOverrides {
            cloud_only: self.cloud_only,
            farms: self.farms,
            gateways_per_farm: self.gateways,
            sensors_per_gateway: self.sensors,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // The configured level is the default; RUST_LOG still wins
    let level = args
        .config
        .as_deref()
        .and_then(config_loader::peek_log_level)
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Starting agrifog scenario builder");
    match &args.config {
        Some(path) => info!("Configuration file: {:?}", path),
        None => info!("No configuration file given, using the reference scenario"),
    }
    info!("Output directory: {:?}", args.output);

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => ScenarioConfig::default(),
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;

    let scenario = scenario::assemble(&config).wrap_err("Failed to assemble scenario")?;
    let files = export::write_scenario(&scenario, &args.output)?;

    if let Some(rounds) = args.sample_readings {
        let mut rng = match config.general.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let options = TelemetryOptions {
            rounds,
            ..TelemetryOptions::default()
        };
        let events = sample_telemetry(scenario.topology(), &options, &mut rng);

        let dry = events
            .iter()
            .filter(|e| matches!(e, TelemetryEvent::Reading(r) if r.is_dry()))
            .count();
        if dry > 0 {
            warn!("{} soil moisture readings are below the dry threshold", dry);
        }

        export::write_telemetry(&events, &args.output.join(TELEMETRY_FILE))?;
    }

    info!("Scenario ready: {:?}", files.scenario);
    Ok(())
}
