//! Application graph type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an edge inside its application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Direction a tuple travels along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Toward the cloud
    Up,
    /// Toward the edge
    Down,
}

/// Role of an edge, fixed by the roles of its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EdgeKind {
    /// Sensor tuple type -> module
    Sensor,
    /// Module -> module
    Module,
    /// Module -> actuator type
    Actuator,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Sensor => "SENSOR",
            EdgeKind::Module => "MODULE",
            EdgeKind::Actuator => "ACTUATOR",
        };
        f.write_str(s)
    }
}

/// A processing stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppModule {
    pub name: String,
    /// RAM reserved per module instance
    pub ram: u32,
}

/// Declaration of an edge, before the builder assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub source: String,
    pub destination: String,
    /// Emission period for periodic edges, `None` for event-driven ones
    pub periodicity: Option<f64>,
    /// Processing cost of one tuple
    pub tuple_cpu_length: f64,
    /// Size of one tuple on the wire
    pub tuple_nw_length: f64,
    pub tuple_type: String,
    pub direction: Direction,
    pub kind: EdgeKind,
}

impl EdgeSpec {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        tuple_type: impl Into<String>,
        direction: Direction,
        kind: EdgeKind,
    ) -> Self {
        EdgeSpec {
            source: source.into(),
            destination: destination.into(),
            periodicity: None,
            tuple_cpu_length: 0.0,
            tuple_nw_length: 0.0,
            tuple_type: tuple_type.into(),
            direction,
            kind,
        }
    }

    pub fn with_costs(mut self, tuple_cpu_length: f64, tuple_nw_length: f64) -> Self {
        self.tuple_cpu_length = tuple_cpu_length;
        self.tuple_nw_length = tuple_nw_length;
        self
    }

    pub fn with_periodicity(mut self, periodicity: f64) -> Self {
        self.periodicity = Some(periodicity);
        self
    }
}

/// A directed, typed connection between two graph vertices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppEdge {
    pub id: EdgeId,
    pub source: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodicity: Option<f64>,
    pub tuple_cpu_length: f64,
    pub tuple_nw_length: f64,
    pub tuple_type: String,
    pub direction: Direction,
    pub kind: EdgeKind,
}

impl AppEdge {
    pub(crate) fn from_spec(id: EdgeId, spec: EdgeSpec) -> Self {
        AppEdge {
            id,
            source: spec.source,
            destination: spec.destination,
            periodicity: spec.periodicity,
            tuple_cpu_length: spec.tuple_cpu_length,
            tuple_nw_length: spec.tuple_nw_length,
            tuple_type: spec.tuple_type,
            direction: spec.direction,
            kind: spec.kind,
        }
    }

    pub fn connects(&self, source: &str, destination: &str) -> bool {
        self.source == source && self.destination == destination
    }
}

/// Probability that an incoming tuple produces an outgoing one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "probability", rename_all = "snake_case")]
pub enum Selectivity {
    /// Forward independently with this probability
    Fractional(f64),
}

impl Selectivity {
    pub fn probability(&self) -> f64 {
        match *self {
            Selectivity::Fractional(p) => p,
        }
    }

    /// `1.0`, the deterministic default used on the control loop
    pub fn always() -> Self {
        Selectivity::Fractional(1.0)
    }
}

/// Forwarding rule attached to a module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TupleMapping {
    pub module: String,
    pub input_type: String,
    pub output_type: String,
    pub selectivity: Selectivity,
    /// Edge that carries the produced tuples
    pub edge: EdgeId,
}

/// A path whose end-to-end latency the engine tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppLoop {
    modules: Vec<String>,
}

impl AppLoop {
    pub(crate) fn new(modules: Vec<String>) -> Self {
        AppLoop { modules }
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn start(&self) -> Option<&str> {
        self.modules.first().map(String::as_str)
    }

    pub fn end(&self) -> Option<&str> {
        self.modules.last().map(String::as_str)
    }

    /// Consecutive vertex pairs
    pub fn steps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.windows(2).map(|w| (w[0].as_str(), w[1].as_str()))
    }

    /// Name used for the latency metric, e.g. `ENV_SENSOR->...->IRRIGATION_CTRL`
    pub fn metric_name(&self) -> String {
        self.modules.join("->")
    }
}
