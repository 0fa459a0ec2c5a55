//! Python Bindings
//!
//! Exposes a graph publisher to Python for inspection and visualization
//! tooling. Snapshots and configuration cross the boundary as JSON.

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::model::{ServiceId, ServiceSnapshot};
use crate::publish::GraphPublisher;

impl From<GraphError> for PyErr {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::ServiceNotFound(_) => PyKeyError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Python-exposed business service graph.
///
/// Holds a publisher; every query runs against the graph that is current
/// at the time of the call.
#[pyclass(name = "ServiceGraph")]
pub struct PyServiceGraph {
    publisher: GraphPublisher,
}

#[pymethods]
impl PyServiceGraph {
    /// Create an empty graph, optionally with a JSON configuration.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => GraphConfig::from_json(json)?,
            None => GraphConfig::default(),
        };
        Ok(Self {
            publisher: GraphPublisher::new(config),
        })
    }

    /// Rebuild from a JSON snapshot. Returns the new generation.
    fn rebuild(&self, snapshot_json: &str) -> PyResult<u64> {
        let snapshot = ServiceSnapshot::from_json(snapshot_json)?;
        Ok(self.publisher.rebuild(&snapshot)?.generation())
    }

    /// Level of a business service.
    fn level_of(&self, service_id: u64) -> PyResult<u32> {
        let graph = self.publisher.current();
        let level = graph.vertex_for_service(ServiceId::from(service_id))?.level();
        Ok(level)
    }

    /// Ids of the business services at `level`.
    fn services_at_level(&self, level: u32) -> Vec<u64> {
        self.publisher
            .current()
            .services_at_level(level)
            .map(|s| s.id.raw())
            .collect()
    }

    /// Highest assigned level, or None for an empty graph.
    #[getter]
    fn max_level(&self) -> Option<u32> {
        self.publisher.current().max_level()
    }

    /// Generation of the current graph.
    #[getter]
    fn generation(&self) -> u64 {
        self.publisher.generation()
    }

    /// The current graph as visualization JSON.
    fn export_json(&self) -> PyResult<String> {
        Ok(self.publisher.current().export().to_json()?)
    }

    fn __repr__(&self) -> String {
        let graph = self.publisher.current();
        format!(
            "ServiceGraph(generation={}, services={}, vertices={})",
            graph.generation(),
            graph.service_count(),
            graph.vertex_count()
        )
    }
}
