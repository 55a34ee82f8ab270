//! Application graph construction errors.

use super::types::EdgeKind;

/// Reasons an application graph is rejected at finalization
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid {what} name: {reason}")]
    InvalidName { what: &'static str, reason: String },

    #[error("Module '{0}' is declared more than once")]
    DuplicateModule(String),

    #[error("Edge {from} -> {to} carrying '{tuple_type}' is declared more than once")]
    DuplicateEdge {
        from: String,
        to: String,
        tuple_type: String,
    },

    #[error("Edge {from} -> {to}: {field} {reason}")]
    InvalidEdgeCost {
        from: String,
        to: String,
        field: &'static str,
        reason: String,
    },

    #[error("{kind} edge {from} -> {to}: {reason}")]
    EdgeKindMismatch {
        kind: EdgeKind,
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("'{0}' is used both as a sensor tuple type and as an actuator type")]
    AmbiguousVertex(String),

    #[error("Tuple mapping references unknown module '{0}'")]
    UnknownMappingModule(String),

    #[error("Tuple mapping on '{module}': no edge delivers '{tuple_type}' into the module")]
    MissingInputEdge { module: String, tuple_type: String },

    #[error("Tuple mapping on '{module}': no edge leaves the module carrying '{tuple_type}'")]
    MissingOutputEdge { module: String, tuple_type: String },

    #[error("Tuple mapping on '{module}': {count} edges leave the module carrying '{tuple_type}'")]
    AmbiguousOutputEdge {
        module: String,
        tuple_type: String,
        count: usize,
    },

    #[error("Tuple mapping on '{module}' to '{output_type}': selectivity {reason}")]
    InvalidSelectivity {
        module: String,
        output_type: String,
        reason: String,
    },

    #[error("Loop #{index} must name at least two vertices")]
    LoopTooShort { index: usize },

    #[error("Loop #{index} steps from '{from}' to '{to}' but no such edge exists")]
    DanglingLoop { index: usize, from: String, to: String },

    #[error("Loop #{index} step '{from}' -> '{to}' matches {count} edges")]
    AmbiguousLoopStep {
        index: usize,
        from: String,
        to: String,
        count: usize,
    },
}
