//! Graph Publication
//!
//! Holds the "current" business service graph and swaps in rebuilt ones.
//!
//! # How It Works
//!
//! 1. Readers call [`GraphPublisher::current`] and get an `Arc` to an
//!    immutable graph. They keep traversing that graph for as long as they
//!    hold the `Arc`, regardless of later rebuilds.
//!
//! 2. A rebuild builds and levels a complete new graph without touching the
//!    published one.
//!
//! 3. Only a successful build is published, by replacing the `Arc` under a
//!    lock that guards the reference and nothing else. A reader therefore
//!    sees the old graph in full or the new graph in full.
//!
//! # Thread Safety
//!
//! Rebuilds are serialized by a writer lock so that version checks and the
//! swap happen atomically with respect to other writers. Readers never wait
//! on a build; they only contend on the reference lock for the duration of
//! an `Arc` clone.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::graph::BusinessServiceGraph;
use crate::model::ServiceSnapshot;

/// Single-writer, multi-reader holder of the current business service graph.
pub struct GraphPublisher {
    config: GraphConfig,

    /// The published graph. The lock guards only the reference.
    current: RwLock<Arc<BusinessServiceGraph>>,

    /// Serializes rebuilds.
    writer: Mutex<()>,
}

impl GraphPublisher {
    /// Create a publisher serving an empty graph.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(BusinessServiceGraph::empty())),
            writer: Mutex::new(()),
        }
    }

    /// The configuration used for every rebuild.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The currently published graph.
    pub fn current(&self) -> Arc<BusinessServiceGraph> {
        Arc::clone(&self.current.read())
    }

    /// Generation of the currently published graph. Starts at 0 and grows by
    /// one with every successful rebuild.
    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    /// Rebuild the graph from `snapshot` and publish it.
    ///
    /// On failure nothing is published and the previous graph keeps serving
    /// reads. Snapshots that are not newer than the published one are
    /// rejected with [`GraphError::StaleSnapshot`]; the very first rebuild
    /// accepts any version.
    pub fn rebuild(&self, snapshot: &ServiceSnapshot) -> Result<Arc<BusinessServiceGraph>> {
        let _writer = self.writer.lock();
        let previous = self.current();

        if previous.generation() > 0 && snapshot.version <= previous.version() {
            tracing::warn!(
                offered = snapshot.version,
                current = previous.version(),
                "discarding stale business service snapshot"
            );
            return Err(GraphError::StaleSnapshot {
                offered: snapshot.version,
                current: previous.version(),
            });
        }

        let graph = match BusinessServiceGraph::build(&snapshot.services, &self.config) {
            Ok(graph) => graph,
            Err(err) => {
                tracing::warn!(
                    version = snapshot.version,
                    generation = previous.generation(),
                    error = %err,
                    "business service graph rebuild failed, keeping previous graph"
                );
                return Err(err);
            }
        };

        let generation = previous.generation() + 1;
        let graph = Arc::new(graph.stamped(snapshot.version, generation));
        // Release the old graph outside the lock; it may be the last reference
        let replaced = std::mem::replace(&mut *self.current.write(), Arc::clone(&graph));
        drop(replaced);

        tracing::info!(
            version = snapshot.version,
            generation,
            services = graph.service_count(),
            vertices = graph.vertex_count(),
            max_level = ?graph.max_level(),
            "published business service graph"
        );

        Ok(graph)
    }
}

impl Default for GraphPublisher {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}
