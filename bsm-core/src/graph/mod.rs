//! Business Service Graph
//!
//! This module builds the dependency graph that status propagation walks.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Service vertices wrap one business service each
//! - Relationship vertices stand for one child relationship each, carrying
//!   its type and aggregation token
//! - Endpoint vertices are the monitored leaves
//! - Edges run from a parent to its relationship vertex, and from the
//!   relationship vertex to the child
//!
//! Every vertex gets a level by longest-path layering: level 0 holds the
//! vertices nothing depends on, and a child always sits below each of its
//! parents.
//!
//! # Design Decisions
//!
//! 1. Vertices live in an arena and are addressed by [`VertexId`] handles.
//!    A graph is cheap to rebuild wholesale and shares no pointers between
//!    vertices, so an `Arc<BusinessServiceGraph>` is trivially `Send + Sync`.
//!
//! 2. A graph is never mutated after it is built. A changed set of
//!    definitions produces a brand-new graph; see [`crate::publish`].
//!
//! 3. We maintain both successor and predecessor lists to enable traversal
//!    in both directions.

mod builder;
mod export;
mod index;
mod levels;
mod vertex;

pub use builder::{GraphBuilder, UnleveledGraph};
pub use export::{EdgeExport, GraphExport, VertexExport};
pub use index::BusinessServiceGraph;
pub use levels::{assign_levels, LevelAssignment};
pub use vertex::{EndpointVertex, GraphEdge, RelationshipVertex, ServiceVertex, Vertex, VertexId, VertexKind};
