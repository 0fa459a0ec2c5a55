//! Versioned snapshots of business service definitions.

use serde::{Deserialize, Serialize};

use super::service::BusinessService;
use crate::error::Result;

/// A consistent set of business service definitions.
///
/// The version orders snapshots produced by the configuration layer; a
/// publisher refuses to replace a graph with one built from an older
/// snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    /// Monotonic version assigned by the configuration layer.
    #[serde(default)]
    pub version: u64,
    /// Every business service known at this version.
    pub services: Vec<BusinessService>,
}

impl ServiceSnapshot {
    /// Create a snapshot.
    pub fn new(version: u64, services: Vec<BusinessService>) -> Self {
        Self { version, services }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of business services in the snapshot.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
