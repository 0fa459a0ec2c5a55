//! BSM Core
//!
//! This crate provides the dependency-graph engine behind the business
//! service impact model. It implements:
//!
//! - Construction of the dependency graph from business service definitions
//! - Level assignment by longest-path layering, with cycle rejection
//! - Lookups by business service, relationship, endpoint and level
//! - Atomic publication of rebuilt graphs to concurrent readers
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `model`: Business service definitions as supplied by the config layer
//! - `graph`: Graph builder, level assigner and the immutable graph index
//! - `publish`: Single-writer publication of the current graph
//! - `config`: Build options
//! - `error`: Error types
//!
//! Status propagation itself lives outside this crate; it walks a published
//! graph bottom-up and resolves each relationship's aggregation token.
//!
//! # Example
//!
//! ```rust
//! use bsm_core::graph::BusinessServiceGraph;
//! use bsm_core::model::{BusinessService, EndpointRef, ServiceId};
//! use bsm_core::GraphConfig;
//!
//! let services = vec![
//!     BusinessService::new(1u64, "shop").with_child_service(2u64, "identity"),
//!     BusinessService::new(2u64, "db").with_endpoint(EndpointRef::IpService(7), "identity"),
//! ];
//! let graph = BusinessServiceGraph::build(&services, &GraphConfig::default()).unwrap();
//!
//! assert_eq!(graph.vertex_for_service(ServiceId::from(2)).unwrap().level(), 1);
//! assert_eq!(graph.vertices_at_level(9).count(), 0);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod publish;

#[cfg(feature = "python")]
mod python;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use graph::{BusinessServiceGraph, Vertex, VertexId, VertexKind};
pub use publish::GraphPublisher;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyServiceGraph>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
