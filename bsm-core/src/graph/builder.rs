//! Graph Builder
//!
//! Turns a set of business service definitions into the vertex and edge sets
//! of the dependency graph. Levels are not assigned here; see
//! [`assign_levels`](super::assign_levels).
//!
//! # Shape
//!
//! For a service `P` with a relationship `r` to a child `C`:
//!
//! ```text
//! P  ->  r  ->  C
//! ```
//!
//! `r` is a relationship vertex carrying the relationship's identity, type
//! and aggregation token. When the child is a monitored endpoint, `C` is a
//! terminal endpoint vertex.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::vertex::{EndpointVertex, GraphEdge, RelationshipVertex, ServiceVertex, VertexId, VertexKind};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::model::{BusinessService, EndpointRef, RelationshipId, RelationshipTarget, ServiceId};

/// Neighbor list of a vertex. Most vertices have very few neighbors.
pub(crate) type Adjacency = SmallVec<[VertexId; 4]>;

/// Vertex and edge sets produced by the builder, before level assignment.
#[derive(Debug, Default)]
pub struct UnleveledGraph {
    pub(crate) vertices: Vec<VertexKind>,
    pub(crate) successors: Vec<Adjacency>,
    pub(crate) predecessors: Vec<Adjacency>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) services: IndexMap<ServiceId, VertexId>,
    pub(crate) relationships: IndexMap<RelationshipId, VertexId>,
    pub(crate) endpoints: IndexMap<EndpointRef, SmallVec<[VertexId; 1]>>,
}

impl UnleveledGraph {
    fn add_vertex(&mut self, kind: VertexKind) -> VertexId {
        let id = VertexId::from_index(self.vertices.len());
        self.vertices.push(kind);
        self.successors.push(Adjacency::new());
        self.predecessors.push(Adjacency::new());
        id
    }

    fn add_edge(&mut self, source: VertexId, target: VertexId) {
        self.successors[source.index()].push(target);
        self.predecessors[target.index()].push(source);
        self.edges.push(GraphEdge { source, target });
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of structural edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Payload of a vertex.
    pub fn kind(&self, id: VertexId) -> Option<&VertexKind> {
        self.vertices.get(id.index())
    }

    /// Direct successors of a vertex.
    pub fn successors(&self, id: VertexId) -> &[VertexId] {
        self.successors.get(id.index()).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Direct predecessors of a vertex.
    pub fn predecessors(&self, id: VertexId) -> &[VertexId] {
        self.predecessors.get(id.index()).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Vertex of a business service.
    pub fn service_vertex(&self, id: ServiceId) -> Option<VertexId> {
        self.services.get(&id).copied()
    }
}

/// Builds the structure of a business service graph.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    /// Create a builder with the given configuration.
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Build the vertex and edge sets for `services`.
    ///
    /// Fails with [`GraphError::DuplicateId`] if two definitions share an id
    /// and with [`GraphError::DanglingReference`] if a relationship names a
    /// business service that is not in `services`.
    pub fn build(&self, services: &[BusinessService]) -> Result<UnleveledGraph> {
        let mut graph = UnleveledGraph::default();

        // Index every service first so children may be declared after their parents
        let mut service_vertices = Vec::with_capacity(services.len());
        for service in services {
            if graph.services.contains_key(&service.id) {
                return Err(GraphError::DuplicateId(service.id));
            }
            let vertex = graph.add_vertex(VertexKind::Service(ServiceVertex::new(Arc::new(service.clone()))));
            graph.services.insert(service.id, vertex);
            service_vertices.push(vertex);
        }

        for (service, &parent) in services.iter().zip(&service_vertices) {
            for (rel_id, rel) in service.relationships_with_ids() {
                let target = match &rel.target {
                    RelationshipTarget::Service(child) => {
                        graph
                            .service_vertex(*child)
                            .ok_or(GraphError::DanglingReference {
                                parent: service.id,
                                child: *child,
                            })?
                    }
                    RelationshipTarget::Endpoint(endpoint) => self.endpoint_vertex(&mut graph, endpoint),
                };

                let rel_vertex = graph.add_vertex(VertexKind::Relationship(RelationshipVertex::new(
                    rel_id,
                    rel.aggregation.clone(),
                    rel.target.clone(),
                )));
                graph.relationships.insert(rel_id, rel_vertex);
                graph.add_edge(parent, rel_vertex);
                graph.add_edge(rel_vertex, target);
            }
        }

        tracing::debug!(
            services = services.len(),
            relationships = graph.relationships.len(),
            endpoints = graph.endpoints.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "built business service graph structure"
        );

        Ok(graph)
    }

    fn endpoint_vertex(&self, graph: &mut UnleveledGraph, endpoint: &EndpointRef) -> VertexId {
        if self.config.share_endpoints {
            if let Some(&existing) = graph.endpoints.get(endpoint).and_then(|v| v.first()) {
                return existing;
            }
        }
        let vertex = graph.add_vertex(VertexKind::Endpoint(EndpointVertex::new(endpoint.clone())));
        graph.endpoints.entry(endpoint.clone()).or_default().push(vertex);
        vertex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipKind;

    fn build(services: &[BusinessService]) -> Result<UnleveledGraph> {
        GraphBuilder::new(&GraphConfig::default()).build(services)
    }

    #[test]
    fn relationship_becomes_vertex_between_parent_and_child() {
        let services = vec![
            BusinessService::new(1u64, "parent").with_child_service(2u64, "identity"),
            BusinessService::new(2u64, "child"),
        ];
        let graph = build(&services).unwrap();

        // Two services plus one relationship vertex
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let parent = graph.service_vertex(ServiceId::from(1)).unwrap();
        let child = graph.service_vertex(ServiceId::from(2)).unwrap();
        let rel = graph.relationships[&RelationshipId { service: ServiceId::from(1), ordinal: 0 }];

        assert_eq!(graph.successors(parent), &[rel]);
        assert_eq!(graph.successors(rel), &[child]);
        assert_eq!(graph.predecessors(child), &[rel]);
        assert!(graph.successors(child).is_empty());

        match graph.kind(rel) {
            Some(VertexKind::Relationship(v)) => {
                assert_eq!(v.kind(), RelationshipKind::ChildService);
                assert_eq!(v.aggregation().as_str(), "identity");
                assert_eq!(v.parent(), ServiceId::from(1));
            }
            other => panic!("expected relationship vertex, got {:?}", other),
        }
    }

    #[test]
    fn children_may_be_declared_before_parents() {
        let services = vec![
            BusinessService::new(2u64, "child"),
            BusinessService::new(1u64, "parent").with_child_service(2u64, "identity"),
        ];
        assert!(build(&services).is_ok());

        let services = vec![
            BusinessService::new(1u64, "parent").with_child_service(2u64, "identity"),
            BusinessService::new(2u64, "child"),
        ];
        assert!(build(&services).is_ok());
    }

    #[test]
    fn dangling_reference_fails() {
        let services = vec![BusinessService::new(1u64, "parent").with_child_service(42u64, "identity")];
        let err = build(&services).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingReference {
                parent: ServiceId::from(1),
                child: ServiceId::from(42),
            }
        );
    }

    #[test]
    fn duplicate_id_fails() {
        let services = vec![BusinessService::new(1u64, "a"), BusinessService::new(1u64, "b")];
        assert_eq!(build(&services).unwrap_err(), GraphError::DuplicateId(ServiceId::from(1)));
    }

    #[test]
    fn endpoints_are_shared_by_default() {
        let endpoint = EndpointRef::IpService(10);
        let services = vec![
            BusinessService::new(1u64, "a").with_endpoint(endpoint.clone(), "identity"),
            BusinessService::new(2u64, "b").with_endpoint(endpoint.clone(), "ignore"),
        ];
        let graph = build(&services).unwrap();

        let vertices = &graph.endpoints[&endpoint];
        assert_eq!(vertices.len(), 1);
        assert_eq!(graph.predecessors(vertices[0]).len(), 2);
        // 2 services + 2 relationships + 1 endpoint
        assert_eq!(graph.vertex_count(), 5);
    }

    #[test]
    fn endpoints_can_be_kept_separate() {
        let endpoint = EndpointRef::ReductionKey("uei.link.down".into());
        let services = vec![
            BusinessService::new(1u64, "a").with_endpoint(endpoint.clone(), "identity"),
            BusinessService::new(2u64, "b").with_endpoint(endpoint.clone(), "identity"),
        ];
        let config = GraphConfig::default().with_shared_endpoints(false);
        let graph = GraphBuilder::new(&config).build(&services).unwrap();

        let vertices = &graph.endpoints[&endpoint];
        assert_eq!(vertices.len(), 2);
        for &v in vertices {
            assert_eq!(graph.predecessors(v).len(), 1);
            assert!(graph.successors(v).is_empty());
        }
    }

    #[test]
    fn self_reference_builds_a_loop() {
        // Rejected later by level assignment, not by the builder
        let services = vec![BusinessService::new(1u64, "loop").with_child_service(1u64, "identity")];
        let graph = build(&services).unwrap();
        let service = graph.service_vertex(ServiceId::from(1)).unwrap();
        assert_eq!(graph.predecessors(service).len(), 1);
    }
}
