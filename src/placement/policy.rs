//! Placement policies.
//!
//! A policy turns placement hints into a complete module-to-device
//! assignment. The static policy is a direct lookup; the edge-ward policy,
//! which walks the tree bottom-up and falls back toward the cloud when a
//! device runs out of capacity, lives in the simulation runtime and plugs in
//! through [`PlacementPolicy`].

use serde::{Deserialize, Serialize};

use crate::application::Application;
use crate::topology::Topology;

use super::mapping::{ModuleMapping, ResolvedPlacement};
use super::PlacementError;

/// Which kind of policy consumes the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Every module is pinned by a hint (cloud-only baseline)
    Static,
    /// Unpinned modules are placed by an edge-ward policy
    Edgewards,
}

impl PlacementMode {
    pub fn from_cloud_only(cloud_only: bool) -> Self {
        if cloud_only {
            PlacementMode::Static
        } else {
            PlacementMode::Edgewards
        }
    }
}

/// Everything a placement policy needs to decide
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub topology: &'a Topology,
    pub application: &'a Application,
    pub mapping: &'a ModuleMapping,
}

/// Resolves a [`PlacementRequest`] into a complete assignment
pub trait PlacementPolicy {
    fn name(&self) -> &str;

    fn place(&self, request: &PlacementRequest<'_>) -> Result<ResolvedPlacement, PlacementError>;
}

/// Direct lookup of the static mapping; every module must be pinned
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticPlacement;

impl PlacementPolicy for StaticPlacement {
    fn name(&self) -> &str {
        "static"
    }

    fn place(&self, request: &PlacementRequest<'_>) -> Result<ResolvedPlacement, PlacementError> {
        let resolved = request.mapping.resolve(request.topology, request.application)?;
        if !resolved.is_complete() {
            return Err(PlacementError::Unresolved(resolved.unresolved));
        }
        Ok(resolved)
    }
}
