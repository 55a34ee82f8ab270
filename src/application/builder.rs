//! Application graph builder.
//!
//! `ApplicationBuilder` only accumulates declarations. All checks run in
//! [`ApplicationBuilder::build`], which either returns a sealed
//! [`Application`] or the first problem found; declaration order only
//! matters for edge ids.

use std::collections::BTreeSet;

use log::{debug, info};
use serde::Serialize;

use crate::utils::validation::{validate_name, validate_non_negative, validate_positive, validate_probability};

use super::error::GraphError;
use super::types::{AppEdge, AppLoop, AppModule, EdgeId, EdgeKind, EdgeSpec, Selectivity, TupleMapping};

#[derive(Debug, Clone)]
struct MappingSpec {
    module: String,
    input_type: String,
    output_type: String,
    selectivity: Selectivity,
}

/// Accumulates modules, edges, tuple mappings and loops
#[derive(Debug, Clone)]
pub struct ApplicationBuilder {
    app_id: String,
    user_id: u32,
    modules: Vec<AppModule>,
    edges: Vec<EdgeSpec>,
    mappings: Vec<MappingSpec>,
    loops: Vec<Vec<String>>,
}

impl ApplicationBuilder {
    pub fn new(app_id: impl Into<String>, user_id: u32) -> Self {
        ApplicationBuilder {
            app_id: app_id.into(),
            user_id,
            modules: Vec::new(),
            edges: Vec::new(),
            mappings: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>, ram: u32) -> &mut Self {
        self.modules.push(AppModule { name: name.into(), ram });
        self
    }

    pub fn add_edge(&mut self, edge: EdgeSpec) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Declare that `module` turns an `input_type` tuple into an
    /// `output_type` tuple with the given selectivity. Several mappings for
    /// the same input are independent decisions.
    pub fn add_tuple_mapping(
        &mut self,
        module: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        selectivity: Selectivity,
    ) -> &mut Self {
        self.mappings.push(MappingSpec {
            module: module.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            selectivity,
        });
        self
    }

    pub fn add_loop<I, S>(&mut self, vertices: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loops.push(vertices.into_iter().map(Into::into).collect());
        self
    }

    /// Validate every declaration and seal the graph
    pub fn build(self) -> Result<Application, GraphError> {
        let module_names = check_modules(&self.modules)?;
        let edges = check_edges(self.edges, &module_names)?;
        let (sensor_types, actuator_types) = endpoint_types(&edges)?;
        let tuple_mappings = check_mappings(self.mappings, &module_names, &edges)?;
        let loops = check_loops(self.loops, &edges)?;

        info!(
            "Application '{}': {} modules, {} edges, {} tuple mappings, {} loops",
            self.app_id,
            self.modules.len(),
            edges.len(),
            tuple_mappings.len(),
            loops.len()
        );

        Ok(Application {
            app_id: self.app_id,
            user_id: self.user_id,
            modules: self.modules,
            edges,
            tuple_mappings,
            loops,
            sensor_types,
            actuator_types,
        })
    }
}

fn check_modules(modules: &[AppModule]) -> Result<BTreeSet<String>, GraphError> {
    let mut names = BTreeSet::new();
    for module in modules {
        validate_name(&module.name).map_err(|reason| GraphError::InvalidName { what: "module", reason })?;
        if !names.insert(module.name.clone()) {
            return Err(GraphError::DuplicateModule(module.name.clone()));
        }
    }
    Ok(names)
}

fn check_edges(specs: Vec<EdgeSpec>, modules: &BTreeSet<String>) -> Result<Vec<AppEdge>, GraphError> {
    let mut seen = BTreeSet::new();
    let mut edges = Vec::with_capacity(specs.len());

    for (idx, spec) in specs.into_iter().enumerate() {
        for (what, name) in [
            ("edge source", &spec.source),
            ("edge destination", &spec.destination),
            ("tuple type", &spec.tuple_type),
        ] {
            validate_name(name).map_err(|reason| GraphError::InvalidName { what, reason })?;
        }

        let cost_error = |field: &'static str, reason: String| GraphError::InvalidEdgeCost {
            from: spec.source.clone(),
            to: spec.destination.clone(),
            field,
            reason,
        };
        validate_non_negative(spec.tuple_cpu_length).map_err(|e| cost_error("tuple_cpu_length", e))?;
        validate_non_negative(spec.tuple_nw_length).map_err(|e| cost_error("tuple_nw_length", e))?;
        if let Some(period) = spec.periodicity {
            validate_positive(period).map_err(|e| cost_error("periodicity", e))?;
        }

        let source_is_module = modules.contains(&spec.source);
        let destination_is_module = modules.contains(&spec.destination);
        let mismatch = match spec.kind {
            EdgeKind::Sensor if source_is_module => Some("source must be a sensor tuple type, not a module"),
            EdgeKind::Sensor if !destination_is_module => Some("destination must be a declared module"),
            EdgeKind::Module if !source_is_module => Some("source must be a declared module"),
            EdgeKind::Module if !destination_is_module => Some("destination must be a declared module"),
            EdgeKind::Actuator if !source_is_module => Some("source must be a declared module"),
            EdgeKind::Actuator if destination_is_module => Some("destination must be an actuator type, not a module"),
            _ => None,
        };
        if let Some(reason) = mismatch {
            return Err(GraphError::EdgeKindMismatch {
                kind: spec.kind,
                from: spec.source,
                to: spec.destination,
                reason,
            });
        }

        let key = (spec.source.clone(), spec.destination.clone(), spec.tuple_type.clone());
        if !seen.insert(key) {
            return Err(GraphError::DuplicateEdge {
                from: spec.source,
                to: spec.destination,
                tuple_type: spec.tuple_type,
            });
        }

        let edge = AppEdge::from_spec(EdgeId(idx), spec);
        debug!(
            "Edge {}: {} -> {} ({}, {})",
            edge.id, edge.source, edge.destination, edge.tuple_type, edge.kind
        );
        edges.push(edge);
    }
    Ok(edges)
}

fn endpoint_types(edges: &[AppEdge]) -> Result<(BTreeSet<String>, BTreeSet<String>), GraphError> {
    let sensor_types: BTreeSet<String> = edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Sensor)
        .map(|e| e.source.clone())
        .collect();
    let actuator_types: BTreeSet<String> = edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Actuator)
        .map(|e| e.destination.clone())
        .collect();

    if let Some(both) = sensor_types.intersection(&actuator_types).next() {
        return Err(GraphError::AmbiguousVertex(both.clone()));
    }
    Ok((sensor_types, actuator_types))
}

fn check_mappings(
    specs: Vec<MappingSpec>,
    modules: &BTreeSet<String>,
    edges: &[AppEdge],
) -> Result<Vec<TupleMapping>, GraphError> {
    let mut mappings = Vec::with_capacity(specs.len());

    for spec in specs {
        if !modules.contains(&spec.module) {
            return Err(GraphError::UnknownMappingModule(spec.module));
        }

        let has_input = edges
            .iter()
            .any(|e| e.destination == spec.module && e.tuple_type == spec.input_type);
        if !has_input {
            return Err(GraphError::MissingInputEdge {
                module: spec.module,
                tuple_type: spec.input_type,
            });
        }

        let outputs: Vec<&AppEdge> = edges
            .iter()
            .filter(|e| e.source == spec.module && e.tuple_type == spec.output_type)
            .collect();
        let edge = match outputs.as_slice() {
            [edge] => edge.id,
            [] => {
                return Err(GraphError::MissingOutputEdge {
                    module: spec.module,
                    tuple_type: spec.output_type,
                })
            }
            many => {
                return Err(GraphError::AmbiguousOutputEdge {
                    module: spec.module,
                    tuple_type: spec.output_type,
                    count: many.len(),
                })
            }
        };

        validate_probability(spec.selectivity.probability()).map_err(|reason| GraphError::InvalidSelectivity {
            module: spec.module.clone(),
            output_type: spec.output_type.clone(),
            reason,
        })?;

        mappings.push(TupleMapping {
            module: spec.module,
            input_type: spec.input_type,
            output_type: spec.output_type,
            selectivity: spec.selectivity,
            edge,
        });
    }
    Ok(mappings)
}

fn check_loops(loops: Vec<Vec<String>>, edges: &[AppEdge]) -> Result<Vec<AppLoop>, GraphError> {
    let mut checked = Vec::with_capacity(loops.len());

    for (index, vertices) in loops.into_iter().enumerate() {
        if vertices.len() < 2 {
            return Err(GraphError::LoopTooShort { index });
        }
        let app_loop = AppLoop::new(vertices);
        for (from, to) in app_loop.steps() {
            match edges.iter().filter(|e| e.connects(from, to)).count() {
                1 => {}
                0 => {
                    return Err(GraphError::DanglingLoop {
                        index,
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                }
                count => {
                    return Err(GraphError::AmbiguousLoopStep {
                        index,
                        from: from.to_string(),
                        to: to.to_string(),
                        count,
                    })
                }
            }
        }
        debug!("Loop #{} declared: {}", index, app_loop.metric_name());
        checked.push(app_loop);
    }
    Ok(checked)
}

/// A validated, immutable application graph
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    app_id: String,
    user_id: u32,
    modules: Vec<AppModule>,
    edges: Vec<AppEdge>,
    tuple_mappings: Vec<TupleMapping>,
    loops: Vec<AppLoop>,
    #[serde(skip)]
    sensor_types: BTreeSet<String>,
    #[serde(skip)]
    actuator_types: BTreeSet<String>,
}

impl Application {
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn modules(&self) -> &[AppModule] {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&AppModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.module(name).is_some()
    }

    pub fn edges(&self) -> &[AppEdge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&AppEdge> {
        self.edges.get(id.0)
    }

    pub fn edges_from<'a>(&'a self, vertex: &'a str) -> impl Iterator<Item = &'a AppEdge> {
        self.edges.iter().filter(move |e| e.source == vertex)
    }

    pub fn edges_into<'a>(&'a self, vertex: &'a str) -> impl Iterator<Item = &'a AppEdge> {
        self.edges.iter().filter(move |e| e.destination == vertex)
    }

    pub fn tuple_mappings(&self) -> &[TupleMapping] {
        &self.tuple_mappings
    }

    /// Forwarding rules of `module` for tuples of `input_type`
    pub fn mappings_for<'a>(&'a self, module: &'a str, input_type: &'a str) -> impl Iterator<Item = &'a TupleMapping> {
        self.tuple_mappings
            .iter()
            .filter(move |m| m.module == module && m.input_type == input_type)
    }

    pub fn loops(&self) -> &[AppLoop] {
        &self.loops
    }

    pub fn sensor_types(&self) -> &BTreeSet<String> {
        &self.sensor_types
    }

    pub fn actuator_types(&self) -> &BTreeSet<String> {
        &self.actuator_types
    }

    /// Modules that appear as an endpoint of at least one edge, in
    /// declaration order
    pub fn referenced_modules(&self) -> Vec<&str> {
        let referenced: BTreeSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.destination.as_str()])
            .collect();
        self.modules
            .iter()
            .map(|m| m.name.as_str())
            .filter(|name| referenced.contains(name))
            .collect()
    }
}
