//! Synthetic field telemetry.
//!
//! Produces environmental readings for every sensor of a topology and the
//! occasional irrigation command, in the JSON shape field gateways publish.
//! Useful for feeding dashboards or replaying a workload without running the
//! simulation engine.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Builder;

use crate::topology::{Sensor, Topology};

/// Soil moisture (%) below which a reading is flagged as dry
pub const DRY_SOIL_THRESHOLD: f64 = 12.0;

/// Irrigation run time attached to each command (s)
pub const IRRIGATION_DURATION_SECS: u32 = 180;

/// Physical quantity measured by one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorKind {
    /// Volumetric water content, %
    SoilMoisture,
    /// Degrees Celsius
    AirTemp,
    /// Relative humidity, %
    Humidity,
    /// kLux
    Light,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::SoilMoisture,
        SensorKind::AirTemp,
        SensorKind::Humidity,
        SensorKind::Light,
    ];

    /// Inclusive range of plausible values
    pub fn range(self) -> (f64, f64) {
        match self {
            SensorKind::SoilMoisture => (8.0, 45.0),
            SensorKind::AirTemp => (12.0, 38.0),
            SensorKind::Humidity => (30.0, 100.0),
            SensorKind::Light => (5.0, 90.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::SoilMoisture => "SOIL_MOISTURE",
            SensorKind::AirTemp => "AIR_TEMP",
            SensorKind::Humidity => "HUMIDITY",
            SensorKind::Light => "LIGHT",
        }
    }
}

/// One environmental measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub gateway_id: String,
    pub sensor_type: SensorKind,
    pub value: f64,
    /// Drought alert, only present on dry soil readings
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry: bool,
}

impl Reading {
    pub fn is_dry(&self) -> bool {
        self.sensor_type == SensorKind::SoilMoisture && self.value < DRY_SOIL_THRESHOLD
    }
}

/// Order for an irrigation actuator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrigationCommand {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub gateway_id: String,
    pub command: String,
    pub duration: u32,
}

/// A line of the telemetry stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryEvent {
    Reading(Reading),
    Irrigation(IrrigationCommand),
}

/// Knobs of a telemetry sampling run
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryOptions {
    pub rounds: usize,
    /// Time between two rounds
    pub cadence: Duration,
    /// Probability per gateway and round of an irrigation command
    pub irrigation_chance: f64,
    pub start: DateTime<Utc>,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        TelemetryOptions {
            rounds: 1,
            cadence: Duration::milliseconds(500),
            irrigation_chance: 0.05,
            start: Utc::now(),
        }
    }
}

/// Simulate one measurement of `kind` for a sensor.
///
/// Values are drawn uniformly within [`SensorKind::range`] and rounded to two
/// decimals; timestamps carry millisecond precision. Ids are version 4 UUIDs
/// drawn from `rng`, so seeded runs repeat.
pub fn simulate_reading<R: Rng + ?Sized>(
    sensor: &Sensor,
    gateway: &str,
    kind: SensorKind,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Reading {
    let (low, high) = kind.range();
    let value = rng.gen_range(low..=high);
    let mut reading = Reading {
        id: Builder::from_random_bytes(rng.gen()).into_uuid().to_string(),
        timestamp: now.trunc_subsecs(3),
        device_id: sensor.name().to_string(),
        gateway_id: gateway.to_string(),
        sensor_type: kind,
        value: (value * 100.0).round() / 100.0,
        dry: false,
    };
    reading.dry = reading.is_dry();
    reading
}

/// Sample `options.rounds` rounds over the whole topology.
///
/// Each round yields one reading per sensor and kind, gateway by gateway,
/// followed by any irrigation command issued for that gateway. Sampling
/// stops early once a round's timestamp is no longer representable.
pub fn sample_telemetry<R: Rng + ?Sized>(
    topology: &Topology,
    options: &TelemetryOptions,
    rng: &mut R,
) -> Vec<TelemetryEvent> {
    let chance = options.irrigation_chance.clamp(0.0, 1.0);
    let mut events = Vec::new();

    for round in 0..options.rounds {
        let now = match i32::try_from(round)
            .ok()
            .and_then(|r| options.cadence.checked_mul(r))
            .and_then(|offset| options.start.checked_add_signed(offset))
        {
            Some(now) => now,
            None => {
                warn!("Round {} falls outside the representable time range; stopping", round);
                break;
            }
        };
        for gateway in topology.gateways() {
            for sensor in topology.sensors_of(gateway.id()) {
                for kind in SensorKind::ALL {
                    events.push(TelemetryEvent::Reading(simulate_reading(
                        sensor,
                        gateway.name(),
                        kind,
                        now,
                        rng,
                    )));
                }
            }

            if rng.gen_bool(chance) {
                for actuator in topology.actuators_of(gateway.id()) {
                    debug!("Round {}: irrigation on {}", round, actuator.name());
                    events.push(TelemetryEvent::Irrigation(IrrigationCommand {
                        timestamp: now.trunc_subsecs(3),
                        device_id: actuator.name().to_string(),
                        gateway_id: gateway.name().to_string(),
                        command: "START".to_string(),
                        duration: IRRIGATION_DURATION_SECS,
                    }));
                }
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::topology::{TopologyBuilder, TopologyParams, TopologyProfiles};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn topology(farms: usize, gateways: usize, sensors: usize) -> Topology {
        let params = TopologyParams {
            farms,
            gateways_per_farm: gateways,
            sensors_per_gateway: sensors,
            ..TopologyParams::default()
        };
        let profiles = TopologyProfiles::default();
        TopologyBuilder::new(&params, &profiles, 1, "smart_agri")
            .build(&IdGenerator::new())
            .unwrap()
    }

    fn readings(events: &[TelemetryEvent]) -> Vec<&Reading> {
        events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::Reading(r) => Some(r),
                TelemetryEvent::Irrigation(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_reading_within_range() {
        let topo = topology(1, 1, 1);
        let sensor = &topo.sensors()[0];
        let mut rng = StdRng::seed_from_u64(3);
        for kind in SensorKind::ALL {
            for _ in 0..200 {
                let reading = simulate_reading(sensor, "gw-0-0", kind, Utc::now(), &mut rng);
                let (low, high) = kind.range();
                assert!(reading.value >= low && reading.value <= high);
                assert_eq!((reading.value * 100.0).round() / 100.0, reading.value);
                assert_eq!(reading.device_id, "s-gw-0-0-0");
                assert_eq!(reading.gateway_id, "gw-0-0");
            }
        }
    }

    #[test]
    fn test_dry_flag() {
        let mut reading = Reading {
            id: "x".to_string(),
            timestamp: Utc::now(),
            device_id: "s-gw-0-0-0".to_string(),
            gateway_id: "gw-0-0".to_string(),
            sensor_type: SensorKind::SoilMoisture,
            value: 11.99,
            dry: true,
        };
        assert!(reading.is_dry());
        reading.value = 12.0;
        assert!(!reading.is_dry());
        reading.sensor_type = SensorKind::AirTemp;
        reading.value = 5.0;
        assert!(!reading.is_dry());
    }

    #[test]
    fn test_one_reading_per_sensor_and_kind() {
        let topo = topology(2, 2, 10);
        let options = TelemetryOptions {
            rounds: 3,
            irrigation_chance: 0.0,
            ..TelemetryOptions::default()
        };
        let events = sample_telemetry(&topo, &options, &mut StdRng::seed_from_u64(1));
        assert_eq!(events.len(), 3 * 40 * 4);
        assert_eq!(readings(&events).len(), events.len());
    }

    #[test]
    fn test_irrigation_commands() {
        let topo = topology(2, 2, 1);
        let options = TelemetryOptions {
            rounds: 2,
            irrigation_chance: 1.0,
            ..TelemetryOptions::default()
        };
        let events = sample_telemetry(&topo, &options, &mut StdRng::seed_from_u64(1));
        let commands: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::Irrigation(c) => Some(c),
                TelemetryEvent::Reading(_) => None,
            })
            .collect();
        assert_eq!(commands.len(), 2 * 4);
        assert!(commands.iter().all(|c| c.command == "START" && c.duration == 180));
        assert_eq!(commands[0].device_id, "irrig-gw-0-0");
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let topo = topology(1, 2, 3);
        let options = TelemetryOptions::default();
        let a = sample_telemetry(&topo, &options, &mut StdRng::seed_from_u64(9));
        let b = sample_telemetry(&topo, &options, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_reading_id_is_uuid_v4() {
        let topo = topology(1, 1, 1);
        let mut rng = StdRng::seed_from_u64(17);
        let reading = simulate_reading(&topo.sensors()[0], "gw-0-0", SensorKind::Light, Utc::now(), &mut rng);

        let id = Uuid::parse_str(&reading.id).unwrap();
        assert_eq!(id.get_version_num(), 4);
        let groups: Vec<usize> = reading.id.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);

        let again = simulate_reading(
            &topo.sensors()[0],
            "gw-0-0",
            SensorKind::Light,
            Utc::now(),
            &mut StdRng::seed_from_u64(17),
        );
        assert_eq!(again.id, reading.id);
    }

    #[test]
    fn test_dry_flag_on_the_wire() {
        let topo = topology(1, 1, 1);
        let mut rng = StdRng::seed_from_u64(4);
        let mut saw_dry = false;
        let mut saw_wet = false;
        for _ in 0..500 {
            let reading = simulate_reading(&topo.sensors()[0], "gw-0-0", SensorKind::SoilMoisture, Utc::now(), &mut rng);
            assert_eq!(reading.dry, reading.is_dry());
            let json = serde_json::to_value(&reading).unwrap();
            if reading.dry {
                assert_eq!(json["dry"], true);
                saw_dry = true;
            } else {
                assert!(json.get("dry").is_none());
                saw_wet = true;
            }
        }
        assert!(saw_dry && saw_wet);
    }

    #[test]
    fn test_sampling_stops_at_time_overflow() {
        let topo = topology(1, 1, 1);
        let options = TelemetryOptions {
            rounds: 5,
            cadence: Duration::days(365 * 100_000),
            irrigation_chance: 0.0,
            ..TelemetryOptions::default()
        };
        let events = sample_telemetry(&topo, &options, &mut StdRng::seed_from_u64(1));
        assert_eq!(events.len(), 3 * SensorKind::ALL.len());
    }

    #[test]
    fn test_wire_shape() {
        let topo = topology(1, 1, 1);
        let reading = simulate_reading(
            &topo.sensors()[0],
            "gw-0-0",
            SensorKind::Humidity,
            Utc::now(),
            &mut StdRng::seed_from_u64(5),
        );
        let json: serde_json::Value = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["sensorType"], "HUMIDITY");
        assert_eq!(json["deviceId"], "s-gw-0-0-0");
        assert!(json.get("gatewayId").is_some());
    }
}
