//! Level Assignment
//!
//! Assigns every vertex its place in the hierarchy by longest-path layering.
//!
//! # Algorithm
//!
//! We use Kahn's algorithm over the structural edges:
//!
//! 1. Count the predecessors of every vertex
//! 2. Seed the queue with every vertex that has none; these are level 0
//! 3. Pop a vertex, relax each successor against it, and remove the edge.
//!    A successor whose last incoming edge was removed joins the queue
//! 4. If vertices remain that never reached in-degree 0, they sit on or
//!    behind a cycle and no assignment exists
//!
//! A vertex is only dequeued once all of its predecessors have been, so at
//! that point its values already hold the maximum over every parent chain.
//! Taking the maximum (rather than the first parent seen) is what keeps a
//! diamond-shaped hierarchy consistent.
//!
//! Two values are computed in the same pass:
//!
//! - `depth`: number of structural edges on the longest path from a root.
//!   Strictly increases along every edge.
//! - `level`: the hierarchy level. A service pushes its relationships one
//!   level down; a relationship vertex hands its own level on to its target.
//!   A child service is therefore exactly one level below its deepest parent
//!   service.

use std::collections::{HashMap, VecDeque};

use super::builder::UnleveledGraph;
use super::vertex::{VertexId, VertexKind};
use crate::error::{GraphError, Result};
use crate::model::ServiceId;

/// Levels computed for every vertex of an [`UnleveledGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAssignment {
    pub(crate) levels: Vec<u32>,
    pub(crate) depths: Vec<u32>,
    pub(crate) order: Vec<VertexId>,
}

impl LevelAssignment {
    /// Hierarchy level of a vertex.
    pub fn level(&self, id: VertexId) -> Option<u32> {
        self.levels.get(id.index()).copied()
    }

    /// Structural depth of a vertex.
    pub fn depth(&self, id: VertexId) -> Option<u32> {
        self.depths.get(id.index()).copied()
    }

    /// Vertices in the order they were finalized. Every vertex appears after
    /// all of its predecessors.
    pub fn order(&self) -> &[VertexId] {
        &self.order
    }

    /// Highest level assigned, or `None` for an empty graph.
    pub fn max_level(&self) -> Option<u32> {
        self.levels.iter().copied().max()
    }
}

/// Assign levels to every vertex of `graph`.
///
/// Runs in O(V + E). Fails with [`GraphError::CyclicDependency`] if the
/// structural edges contain a cycle.
pub fn assign_levels(graph: &UnleveledGraph) -> Result<LevelAssignment> {
    let count = graph.vertex_count();
    let mut in_degree: Vec<usize> = graph.predecessors.iter().map(|p| p.len()).collect();
    let mut levels = vec![0u32; count];
    let mut depths = vec![0u32; count];
    let mut order = Vec::with_capacity(count);

    let mut queue: VecDeque<VertexId> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| VertexId::from_index(index))
        .collect();

    // Kahn's algorithm
    while let Some(vertex) = queue.pop_front() {
        order.push(vertex);

        let index = vertex.index();
        let step = graph.vertices[index].level_step();
        let (level, depth) = (levels[index], depths[index]);

        for &successor in graph.successors(vertex) {
            let s = successor.index();
            levels[s] = levels[s].max(level + step);
            depths[s] = depths[s].max(depth + 1);

            in_degree[s] -= 1;
            if in_degree[s] == 0 {
                queue.push_back(successor);
            }
        }
    }

    if order.len() < count {
        let cycle = find_cycle(graph, &in_degree);
        tracing::debug!(
            finalized = order.len(),
            vertices = count,
            cycle = ?cycle,
            "level assignment found a cycle"
        );
        return Err(GraphError::CyclicDependency { cycle });
    }

    let assignment = LevelAssignment { levels, depths, order };
    tracing::debug!(
        vertices = count,
        max_level = ?assignment.max_level(),
        "assigned business service graph levels"
    );
    Ok(assignment)
}

/// Extract one cycle from the vertices Kahn's algorithm could not finalize.
///
/// Every unfinalized vertex has at least one unfinalized predecessor, so
/// walking predecessors from any of them must eventually revisit a vertex.
/// Returns the business services on that cycle in parent-to-child order,
/// starting from the lowest id.
fn find_cycle(graph: &UnleveledGraph, in_degree: &[usize]) -> Vec<ServiceId> {
    let Some(start) = in_degree.iter().position(|&degree| degree > 0) else {
        return Vec::new();
    };

    let mut path: Vec<VertexId> = Vec::new();
    let mut on_path: HashMap<VertexId, usize> = HashMap::new();
    let mut current = VertexId::from_index(start);

    let cycle = loop {
        if let Some(&at) = on_path.get(&current) {
            break path.split_off(at);
        }
        on_path.insert(current, path.len());
        path.push(current);

        match graph
            .predecessors(current)
            .iter()
            .find(|p| in_degree[p.index()] > 0)
        {
            Some(&previous) => current = previous,
            None => break path,
        }
    };

    // The walk went child-to-parent
    let mut services: Vec<ServiceId> = cycle
        .iter()
        .rev()
        .filter_map(|&v| match &graph.vertices[v.index()] {
            VertexKind::Service(service) => Some(service.service_id()),
            _ => None,
        })
        .collect();

    if let Some(lowest) = services
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(index, _)| index)
    {
        services.rotate_left(lowest);
    }
    services
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph::builder::GraphBuilder;
    use crate::model::{BusinessService, EndpointRef};

    fn levels_of(services: &[BusinessService]) -> Result<(UnleveledGraph, LevelAssignment)> {
        let graph = GraphBuilder::new(&GraphConfig::default()).build(services)?;
        let levels = assign_levels(&graph)?;
        Ok((graph, levels))
    }

    fn service_level(graph: &UnleveledGraph, levels: &LevelAssignment, id: u64) -> u32 {
        let vertex = graph.service_vertex(ServiceId::from(id)).unwrap();
        levels.level(vertex).unwrap()
    }

    #[test]
    fn chain_levels_count_services_only() {
        let services = vec![
            BusinessService::new(1u64, "a").with_child_service(2u64, "identity"),
            BusinessService::new(2u64, "b").with_child_service(3u64, "identity"),
            BusinessService::new(3u64, "c"),
        ];
        let (graph, levels) = levels_of(&services).unwrap();

        assert_eq!(service_level(&graph, &levels, 1), 0);
        assert_eq!(service_level(&graph, &levels, 2), 1);
        assert_eq!(service_level(&graph, &levels, 3), 2);

        // Depth counts every structural edge, relationship vertices included
        let c = graph.service_vertex(ServiceId::from(3)).unwrap();
        assert_eq!(levels.depth(c), Some(4));
        assert_eq!(levels.max_level(), Some(2));
    }

    #[test]
    fn diamond_takes_longest_parent_chain() {
        // 1 -> 2 -> 3, and 1 -> 3 directly
        let services = vec![
            BusinessService::new(1u64, "top")
                .with_child_service(2u64, "identity")
                .with_child_service(3u64, "identity"),
            BusinessService::new(2u64, "middle").with_child_service(3u64, "identity"),
            BusinessService::new(3u64, "bottom"),
        ];
        let (graph, levels) = levels_of(&services).unwrap();

        assert_eq!(service_level(&graph, &levels, 3), 2);
    }

    #[test]
    fn relationship_and_endpoint_sit_below_parent() {
        let services = vec![BusinessService::new(1u64, "a").with_endpoint(EndpointRef::IpService(5), "identity")];
        let (graph, levels) = levels_of(&services).unwrap();

        let endpoint = graph.endpoints[&EndpointRef::IpService(5)][0];
        let rel = graph.predecessors(endpoint)[0];
        assert_eq!(levels.level(rel), Some(1));
        assert_eq!(levels.level(endpoint), Some(1));
        assert_eq!(levels.depth(endpoint), Some(2));
    }

    #[test]
    fn order_respects_every_edge() {
        let services = vec![
            BusinessService::new(3u64, "c"),
            BusinessService::new(2u64, "b").with_child_service(3u64, "identity"),
            BusinessService::new(1u64, "a").with_child_service(2u64, "identity"),
        ];
        let (graph, levels) = levels_of(&services).unwrap();

        let position: HashMap<VertexId, usize> = levels
            .order()
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();
        assert_eq!(position.len(), graph.vertex_count());
        for edge in &graph.edges {
            assert!(position[&edge.source] < position[&edge.target]);
        }
    }

    #[test]
    fn cycle_is_rejected_and_reported() {
        let services = vec![
            BusinessService::new(1u64, "root").with_child_service(2u64, "identity"),
            BusinessService::new(2u64, "a").with_child_service(3u64, "identity"),
            BusinessService::new(3u64, "b").with_child_service(4u64, "identity"),
            BusinessService::new(4u64, "c").with_child_service(2u64, "identity"),
        ];
        let err = levels_of(&services).unwrap_err();

        assert_eq!(
            err,
            GraphError::CyclicDependency {
                cycle: vec![ServiceId::from(2), ServiceId::from(3), ServiceId::from(4)],
            }
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let services = vec![BusinessService::new(7u64, "loop").with_child_service(7u64, "identity")];
        let err = levels_of(&services).unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicDependency {
                cycle: vec![ServiceId::from(7)],
            }
        );
    }

    #[test]
    fn empty_graph_has_no_levels() {
        let (_, levels) = levels_of(&[]).unwrap();
        assert_eq!(levels.max_level(), None);
        assert!(levels.order().is_empty());
    }
}
