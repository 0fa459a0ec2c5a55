//! Graph Vertices
//!
//! This module defines the vertex and edge types that live in the business
//! service graph.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{
    AggregationToken, BusinessService, EndpointRef, RelationshipId, RelationshipKind, RelationshipTarget,
    ServiceId,
};

/// Handle of a vertex inside one graph.
///
/// Handles are arena indexes: they are only meaningful for the graph that
/// produced them and must not be carried across a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(u32);

impl VertexId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the vertex in the graph's arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A vertex wrapping one business service.
#[derive(Debug, Clone)]
pub struct ServiceVertex {
    service: Arc<BusinessService>,
}

impl ServiceVertex {
    pub(crate) fn new(service: Arc<BusinessService>) -> Self {
        Self { service }
    }

    /// The wrapped definition.
    pub fn business_service(&self) -> &BusinessService {
        &self.service
    }

    /// Id of the wrapped business service.
    pub fn service_id(&self) -> ServiceId {
        self.service.id
    }
}

/// A synthetic vertex standing for one relationship instance.
///
/// It sits between the owning service and the relationship's target, so the
/// relationship's metadata can be inspected like any other vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipVertex {
    id: RelationshipId,
    aggregation: AggregationToken,
    target: RelationshipTarget,
}

impl RelationshipVertex {
    pub(crate) fn new(id: RelationshipId, aggregation: AggregationToken, target: RelationshipTarget) -> Self {
        Self { id, aggregation, target }
    }

    /// Identity of the relationship.
    pub fn id(&self) -> RelationshipId {
        self.id
    }

    /// The business service owning the relationship.
    pub fn parent(&self) -> ServiceId {
        self.id.service
    }

    /// Type tag of the relationship.
    pub fn kind(&self) -> RelationshipKind {
        match self.target {
            RelationshipTarget::Service(_) => RelationshipKind::ChildService,
            RelationshipTarget::Endpoint(_) => RelationshipKind::Endpoint,
        }
    }

    /// The aggregation function reference, passed through untouched.
    pub fn aggregation(&self) -> &AggregationToken {
        &self.aggregation
    }

    /// What the relationship points at.
    pub fn target(&self) -> &RelationshipTarget {
        &self.target
    }
}

/// A terminal vertex for a monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointVertex {
    endpoint: EndpointRef,
}

impl EndpointVertex {
    pub(crate) fn new(endpoint: EndpointRef) -> Self {
        Self { endpoint }
    }

    /// The endpoint this vertex represents.
    pub fn endpoint(&self) -> &EndpointRef {
        &self.endpoint
    }
}

/// The payload of a vertex.
#[derive(Debug, Clone)]
pub enum VertexKind {
    /// A business service.
    Service(ServiceVertex),

    /// A relationship instance between a service and its child.
    Relationship(RelationshipVertex),

    /// A monitored endpoint. These are leaves of the graph.
    Endpoint(EndpointVertex),
}

impl VertexKind {
    /// How many hierarchy levels lie between this vertex and its successors.
    ///
    /// Services push their children one level down. A relationship vertex is
    /// part of its parent's step, so its target shares its level.
    pub(crate) fn level_step(&self) -> u32 {
        match self {
            VertexKind::Service(_) | VertexKind::Endpoint(_) => 1,
            VertexKind::Relationship(_) => 0,
        }
    }

    /// Short tag naming the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            VertexKind::Service(_) => "service",
            VertexKind::Relationship(_) => "relationship",
            VertexKind::Endpoint(_) => "endpoint",
        }
    }

    /// Human-readable label, used for visualization.
    pub fn label(&self) -> String {
        match self {
            VertexKind::Service(v) => format!("BS[{}]", v.business_service().name),
            VertexKind::Relationship(v) => format!("{}[{}]", v.kind(), v.id()),
            VertexKind::Endpoint(v) => v.endpoint().to_string(),
        }
    }
}

/// A vertex of a built graph, with its assigned level.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    kind: VertexKind,
    level: u32,
    depth: u32,
}

impl Vertex {
    pub(crate) fn new(id: VertexId, kind: VertexKind, level: u32, depth: u32) -> Self {
        Self { id, kind, level, depth }
    }

    /// Handle of this vertex.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The vertex payload.
    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    /// Hierarchy level. 0 means nothing depends on this vertex.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Longest number of structural edges from a root to this vertex.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether this vertex has no structural predecessors.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// The business service, if this is a service vertex.
    pub fn business_service(&self) -> Option<&BusinessService> {
        match &self.kind {
            VertexKind::Service(v) => Some(v.business_service()),
            _ => None,
        }
    }

    /// The relationship payload, if this is a relationship vertex.
    pub fn relationship(&self) -> Option<&RelationshipVertex> {
        match &self.kind {
            VertexKind::Relationship(v) => Some(v),
            _ => None,
        }
    }

    /// The endpoint, if this is an endpoint vertex.
    pub fn endpoint(&self) -> Option<&EndpointRef> {
        match &self.kind {
            VertexKind::Endpoint(v) => Some(v.endpoint()),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        self.kind.label()
    }
}

/// A structural connection between two vertices.
///
/// Edges carry no state of their own; relationship semantics live on the
/// relationship vertex at one of the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// The vertex the edge leaves.
    pub source: VertexId,
    /// The vertex the edge enters.
    pub target: VertexId,
}
