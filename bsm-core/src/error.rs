//! Error Types
//!
//! Every failure in this crate is local and synchronous: a build, a publish
//! or a query fails, and the caller decides what to do. A failed rebuild never
//! replaces the graph that is currently published.

use thiserror::Error;

use crate::model::ServiceId;

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors produced while building, publishing or querying a business
/// service graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A relationship names a child business service that is not part of the
    /// input snapshot.
    #[error("business service {parent} references unknown business service {child}")]
    DanglingReference {
        /// The service owning the relationship.
        parent: ServiceId,
        /// The missing child id.
        child: ServiceId,
    },

    /// Two input definitions share the same id.
    #[error("duplicate business service id {0}")]
    DuplicateId(ServiceId),

    /// The structural edges contain a cycle, so no level assignment exists.
    #[error("cyclic dependency between business services {}", format_cycle(.cycle))]
    CyclicDependency {
        /// Business services on the cycle, in traversal order.
        cycle: Vec<ServiceId>,
    },

    /// The queried business service is not part of this graph.
    #[error("business service {0} not found")]
    ServiceNotFound(ServiceId),

    /// A rebuild was offered a snapshot that is not newer than the one
    /// already published.
    #[error("snapshot version {offered} is not newer than published version {current}")]
    StaleSnapshot {
        /// Version of the rejected snapshot.
        offered: u64,
        /// Version currently published.
        current: u64,
    },

    /// A snapshot, configuration or export could not be (de)serialized.
    #[error("serialization error: {0}")]
    Snapshot(String),
}

impl GraphError {
    /// Whether this error comes from the input definitions rather than from a
    /// query. Such errors are never worth retrying with the same snapshot.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            GraphError::DanglingReference { .. }
                | GraphError::DuplicateId(_)
                | GraphError::CyclicDependency { .. }
        )
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Snapshot(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for GraphError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        GraphError::Snapshot(err.to_string())
    }
}

fn format_cycle(cycle: &[ServiceId]) -> String {
    let mut out = String::new();
    for id in cycle {
        out.push_str(&id.to_string());
        out.push_str(" -> ");
    }
    match cycle.first() {
        Some(first) => out.push_str(&first.to_string()),
        None => out.push_str("?"),
    }
    out
}
