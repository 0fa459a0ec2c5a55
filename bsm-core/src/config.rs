//! Build Configuration
//!
//! Options that influence graph construction. They are passed explicitly
//! into every build so that two builds with the same snapshot and the same
//! configuration always produce the same graph.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for building a business service graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Represent each monitored endpoint by a single vertex shared by every
    /// relationship that targets it. When disabled, every endpoint
    /// relationship gets its own terminal vertex.
    pub share_endpoints: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            share_endpoints: true,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set whether endpoint vertices are shared.
    pub fn with_shared_endpoints(mut self, share: bool) -> Self {
        self.share_endpoints = share;
        self
    }
}
