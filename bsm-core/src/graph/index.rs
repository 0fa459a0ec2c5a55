//! Business Service Graph
//!
//! The published, immutable result of one build. Every query is a read over
//! plain vectors and maps, so a graph behind an `Arc` can be traversed by
//! any number of threads without locking.

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::builder::{Adjacency, GraphBuilder, UnleveledGraph};
use super::levels::{assign_levels, LevelAssignment};
use super::vertex::{GraphEdge, Vertex, VertexId};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::model::{BusinessService, EndpointRef, RelationshipId, ServiceId};

/// Dependency graph over a snapshot of business services, with every vertex
/// assigned its hierarchy level.
#[derive(Debug, Default)]
pub struct BusinessServiceGraph {
    vertices: Vec<Vertex>,
    successors: Vec<Adjacency>,
    predecessors: Vec<Adjacency>,
    edges: Vec<GraphEdge>,
    services: IndexMap<ServiceId, VertexId>,
    relationships: IndexMap<RelationshipId, VertexId>,
    endpoints: IndexMap<EndpointRef, SmallVec<[VertexId; 1]>>,
    /// Vertex ids grouped by level; index is the level.
    by_level: Vec<Vec<VertexId>>,
    /// Kahn order: parents before children.
    order: Vec<VertexId>,
    version: u64,
    generation: u64,
}

impl BusinessServiceGraph {
    /// An empty graph, as served before the first successful build.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build and level a graph from `services`.
    pub fn build(services: &[BusinessService], config: &GraphConfig) -> Result<Self> {
        let structure = GraphBuilder::new(config).build(services)?;
        let levels = assign_levels(&structure)?;
        Ok(Self::from_parts(structure, levels))
    }

    /// Combine a built structure with its level assignment.
    pub(crate) fn from_parts(structure: UnleveledGraph, levels: LevelAssignment) -> Self {
        let UnleveledGraph {
            vertices,
            successors,
            predecessors,
            edges,
            services,
            relationships,
            endpoints,
        } = structure;
        let LevelAssignment {
            levels,
            depths,
            order,
        } = levels;

        let max_level = levels.iter().copied().max();
        let mut by_level: Vec<Vec<VertexId>> = match max_level {
            Some(max) => vec![Vec::new(); max as usize + 1],
            None => Vec::new(),
        };

        let vertices: Vec<Vertex> = vertices
            .into_iter()
            .enumerate()
            .map(|(index, kind)| {
                let id = VertexId::from_index(index);
                let level = levels[index];
                by_level[level as usize].push(id);
                Vertex::new(id, kind, level, depths[index])
            })
            .collect();

        Self {
            vertices,
            successors,
            predecessors,
            edges,
            services,
            relationships,
            endpoints,
            by_level,
            order,
            version: 0,
            generation: 0,
        }
    }

    pub(crate) fn stamped(mut self, version: u64, generation: u64) -> Self {
        self.version = version;
        self.generation = generation;
        self
    }

    /// Vertex of a business service.
    ///
    /// Fails with [`GraphError::ServiceNotFound`] if the id was not part of
    /// the snapshot this graph was built from.
    pub fn vertex_for_service(&self, id: ServiceId) -> Result<&Vertex> {
        self.services
            .get(&id)
            .and_then(|v| self.vertex(*v))
            .ok_or(GraphError::ServiceNotFound(id))
    }

    /// Vertex of a relationship instance.
    pub fn vertex_for_relationship(&self, id: RelationshipId) -> Option<&Vertex> {
        self.relationships.get(&id).and_then(|v| self.vertex(*v))
    }

    /// Vertices representing a monitored endpoint. At most one when
    /// endpoints are shared.
    pub fn vertices_for_endpoint<'a>(&'a self, endpoint: &EndpointRef) -> impl Iterator<Item = &'a Vertex> + 'a {
        let ids: &[VertexId] = self.endpoints.get(endpoint).map(|v| v.as_slice()).unwrap_or(&[]);
        self.resolve(ids)
    }

    /// Vertex by handle.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// All vertices at `level`. Empty for any level above [`max_level`](Self::max_level).
    pub fn vertices_at_level(&self, level: u32) -> impl Iterator<Item = &Vertex> + '_ {
        let ids: &[VertexId] = self
            .by_level
            .get(level as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        self.resolve(ids)
    }

    /// Business services at `level`.
    pub fn services_at_level(&self, level: u32) -> impl Iterator<Item = &BusinessService> + '_ {
        self.vertices_at_level(level).filter_map(Vertex::business_service)
    }

    /// Direct structural successors of a vertex.
    pub fn successors_of(&self, id: VertexId) -> impl Iterator<Item = &Vertex> + '_ {
        let ids: &[VertexId] = self.successors.get(id.index()).map(|a| a.as_slice()).unwrap_or(&[]);
        self.resolve(ids)
    }

    /// Direct structural predecessors of a vertex.
    pub fn predecessors_of(&self, id: VertexId) -> impl Iterator<Item = &Vertex> + '_ {
        let ids: &[VertexId] = self.predecessors.get(id.index()).map(|a| a.as_slice()).unwrap_or(&[]);
        self.resolve(ids)
    }

    /// Business services that directly depend on `id`.
    pub fn parent_services(&self, id: ServiceId) -> Result<Vec<&BusinessService>> {
        let vertex = self.vertex_for_service(id)?;
        Ok(self
            .predecessors_of(vertex.id())
            .flat_map(|rel| self.predecessors_of(rel.id()))
            .filter_map(Vertex::business_service)
            .collect())
    }

    /// Business services `id` directly depends on, in relationship order.
    pub fn child_services(&self, id: ServiceId) -> Result<Vec<&BusinessService>> {
        let vertex = self.vertex_for_service(id)?;
        Ok(self
            .successors_of(vertex.id())
            .flat_map(|rel| self.successors_of(rel.id()))
            .filter_map(Vertex::business_service)
            .collect())
    }

    /// Vertices nothing depends on.
    pub fn roots(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices_at_level(0)
    }

    /// Vertices ordered so that every vertex follows all of its predecessors.
    pub fn topological_order(&self) -> impl DoubleEndedIterator<Item = &Vertex> + '_ {
        self.resolve(&self.order)
    }

    /// Vertices ordered so that every vertex precedes all of its
    /// predecessors: endpoints and leaf services first. This is the order
    /// a status-propagation pass walks.
    pub fn bottom_up(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.topological_order().rev()
    }

    /// Highest assigned level, or `None` for an empty graph.
    pub fn max_level(&self) -> Option<u32> {
        self.by_level.len().checked_sub(1).map(|l| l as u32)
    }

    /// All vertices, in handle order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// All structural edges.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Ids of every business service in the graph, in snapshot order.
    pub fn service_ids(&self) -> impl Iterator<Item = ServiceId> + '_ {
        self.services.keys().copied()
    }

    /// Whether a business service is part of this graph.
    pub fn contains_service(&self, id: ServiceId) -> bool {
        self.services.contains_key(&id)
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Total number of structural edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of business services.
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Version of the snapshot this graph was built from.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// How many graphs were published before this one by its publisher.
    /// Zero for graphs that were never published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn resolve<'a>(&'a self, ids: &'a [VertexId]) -> impl DoubleEndedIterator<Item = &'a Vertex> + 'a {
        ids.iter().filter_map(move |id| self.vertices.get(id.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationshipKind;

    fn sample() -> BusinessServiceGraph {
        let services = vec![
            BusinessService::new(1u64, "shop")
                .with_child_service(2u64, "identity")
                .with_child_service(3u64, "increase"),
            BusinessService::new(2u64, "web").with_endpoint(EndpointRef::IpService(11), "identity"),
            BusinessService::new(3u64, "db").with_endpoint(EndpointRef::IpService(11), "identity"),
        ];
        BusinessServiceGraph::build(&services, &GraphConfig::default()).unwrap()
    }

    #[test]
    fn service_lookup() {
        let graph = sample();
        let web = graph.vertex_for_service(ServiceId::from(2)).unwrap();
        assert_eq!(web.level(), 1);
        assert_eq!(web.business_service().unwrap().name, "web");

        assert_eq!(
            graph.vertex_for_service(ServiceId::from(99)).unwrap_err(),
            GraphError::ServiceNotFound(ServiceId::from(99))
        );
    }

    #[test]
    fn levels_group_vertices() {
        let graph = sample();

        let roots: Vec<_> = graph.services_at_level(0).map(|s| s.id).collect();
        assert_eq!(roots, vec![ServiceId::from(1)]);

        let mut level_one: Vec<_> = graph.services_at_level(1).map(|s| s.id).collect();
        level_one.sort();
        assert_eq!(level_one, vec![ServiceId::from(2), ServiceId::from(3)]);

        // The shared endpoint sits below both of its parents
        let endpoint: Vec<_> = graph.vertices_for_endpoint(&EndpointRef::IpService(11)).collect();
        assert_eq!(endpoint.len(), 1);
        assert_eq!(endpoint[0].level(), 2);

        assert_eq!(graph.max_level(), Some(2));
        assert_eq!(graph.vertices_at_level(3).count(), 0);
        assert_eq!(graph.vertices_at_level(u32::MAX).count(), 0);
    }

    #[test]
    fn relationship_lookup_exposes_metadata() {
        let graph = sample();
        let rel = graph
            .vertex_for_relationship(RelationshipId { service: ServiceId::from(1), ordinal: 1 })
            .and_then(Vertex::relationship)
            .unwrap();

        assert_eq!(rel.kind(), RelationshipKind::ChildService);
        assert_eq!(rel.aggregation().as_str(), "increase");
        assert!(graph
            .vertex_for_relationship(RelationshipId { service: ServiceId::from(1), ordinal: 5 })
            .is_none());
    }

    #[test]
    fn neighbors_walk_through_relationship_vertices() {
        let graph = sample();

        let children: Vec<_> = graph
            .child_services(ServiceId::from(1))
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(children, vec![ServiceId::from(2), ServiceId::from(3)]);

        let parents: Vec<_> = graph
            .parent_services(ServiceId::from(3))
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(parents, vec![ServiceId::from(1)]);

        let shop = graph.vertex_for_service(ServiceId::from(1)).unwrap();
        assert!(graph.predecessors_of(shop.id()).next().is_none());
        assert!(graph.successors_of(shop.id()).all(|v| v.relationship().is_some()));
    }

    #[test]
    fn bottom_up_visits_children_first() {
        let graph = sample();
        let position: std::collections::HashMap<VertexId, usize> = graph
            .bottom_up()
            .enumerate()
            .map(|(i, v)| (v.id(), i))
            .collect();

        assert_eq!(position.len(), graph.vertex_count());
        for edge in graph.edges() {
            assert!(position[&edge.target] < position[&edge.source]);
        }
    }

    #[test]
    fn empty_graph_answers_queries() {
        let graph = BusinessServiceGraph::empty();
        assert_eq!(graph.max_level(), None);
        assert_eq!(graph.vertices_at_level(0).count(), 0);
        assert_eq!(graph.vertex_count(), 0);
        assert!(graph.vertex_for_service(ServiceId::from(1)).is_err());
    }
}
