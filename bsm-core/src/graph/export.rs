//! Graph Export
//!
//! A flat, serializable description of a built graph for visualization and
//! debugging tools. Nothing in the propagation path depends on it.

use serde::{Deserialize, Serialize};

use super::index::BusinessServiceGraph;
use super::vertex::{VertexId, VertexKind};
use crate::error::Result;
use crate::model::{AggregationToken, EndpointRef, RelationshipId, RelationshipKind, ServiceId};

/// One exported vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexExport {
    pub id: VertexId,
    /// `service`, `relationship` or `endpoint`.
    pub kind: String,
    pub label: String,
    pub level: u32,
    pub depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_kind: Option<RelationshipKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<AggregationToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointRef>,
}

/// One exported structural edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: VertexId,
    pub target: VertexId,
}

/// Serializable view of a whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub version: u64,
    pub generation: u64,
    pub max_level: Option<u32>,
    pub vertices: Vec<VertexExport>,
    pub edges: Vec<EdgeExport>,
}

impl GraphExport {
    /// Capture `graph`.
    pub fn from_graph(graph: &BusinessServiceGraph) -> Self {
        let vertices = graph
            .vertices()
            .iter()
            .map(|vertex| {
                let mut export = VertexExport {
                    id: vertex.id(),
                    kind: vertex.kind().tag().to_string(),
                    label: vertex.label(),
                    level: vertex.level(),
                    depth: vertex.depth(),
                    service: None,
                    relationship: None,
                    relationship_kind: None,
                    aggregation: None,
                    endpoint: None,
                };
                match vertex.kind() {
                    VertexKind::Service(v) => export.service = Some(v.service_id()),
                    VertexKind::Relationship(v) => {
                        export.relationship = Some(v.id());
                        export.relationship_kind = Some(v.kind());
                        export.aggregation = Some(v.aggregation().clone());
                    }
                    VertexKind::Endpoint(v) => export.endpoint = Some(v.endpoint().clone()),
                }
                export
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeExport {
                source: edge.source,
                target: edge.target,
            })
            .collect();

        Self {
            version: graph.version(),
            generation: graph.generation(),
            max_level: graph.max_level(),
            vertices,
            edges,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to MessagePack.
    pub fn to_msgpack(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}

impl BusinessServiceGraph {
    /// Capture this graph for visualization.
    pub fn export(&self) -> GraphExport {
        GraphExport::from_graph(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::model::BusinessService;

    fn sample() -> BusinessServiceGraph {
        let services = vec![
            BusinessService::new(1u64, "shop").with_child_service(2u64, "identity"),
            BusinessService::new(2u64, "db").with_endpoint(EndpointRef::ReductionKey("uei.db.down".into()), "ignore"),
        ];
        BusinessServiceGraph::build(&services, &GraphConfig::default()).unwrap()
    }

    #[test]
    fn export_covers_every_vertex_and_edge() {
        let graph = sample();
        let export = graph.export();

        assert_eq!(export.vertices.len(), graph.vertex_count());
        assert_eq!(export.edges.len(), graph.edge_count());
        assert_eq!(export.max_level, Some(2));

        let db = export
            .vertices
            .iter()
            .find(|v| v.service == Some(ServiceId::from(2)))
            .unwrap();
        assert_eq!(db.label, "BS[db]");
        assert_eq!(db.level, 1);

        let rel = export
            .vertices
            .iter()
            .find(|v| v.aggregation.as_ref().map(|a| a.as_str()) == Some("ignore"))
            .unwrap();
        assert_eq!(rel.kind, "relationship");
        assert_eq!(rel.relationship_kind, Some(RelationshipKind::Endpoint));
    }

    #[test]
    fn json_omits_absent_payloads() {
        let json = sample().export().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value["vertices"][0];
        assert_eq!(first["kind"], "service");
        assert!(first.get("endpoint").is_none());
        assert!(first.get("aggregation").is_none());
    }

    #[test]
    fn msgpack_decodes_back() {
        let export = sample().export();
        let bytes = export.to_msgpack().unwrap();
        let decoded: GraphExport = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, export);
    }
}
