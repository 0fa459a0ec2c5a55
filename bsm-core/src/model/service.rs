//! Business Service Definitions
//!
//! The read-only view of a business service as handed over by the
//! configuration layer. Nothing here is ever mutated by the graph engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a business service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(u64);

impl ServiceId {
    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ServiceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the aggregation function applied along a relationship.
///
/// The graph engine never interprets this value. It is carried through to
/// the relationship vertex so the status-propagation pass can resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationToken(String);

impl AggregationToken {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as given by the configuration layer.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AggregationToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl fmt::Display for AggregationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monitored endpoint: a leaf of the hierarchy with no children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRef {
    /// A monitored service on an interface, by its id.
    IpService(u32),
    /// An alarm reduction key.
    ReductionKey(String),
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRef::IpService(id) => write!(f, "IpService[{}]", id),
            EndpointRef::ReductionKey(key) => write!(f, "ReductionKey[{}]", key),
        }
    }
}

/// What a relationship points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipTarget {
    /// Another business service.
    Service(ServiceId),
    /// A monitored endpoint.
    Endpoint(EndpointRef),
}

/// Type tag of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Business service to business service.
    ChildService,
    /// Business service to monitored endpoint.
    Endpoint,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::ChildService => f.write_str("ChildService"),
            RelationshipKind::Endpoint => f.write_str("Endpoint"),
        }
    }
}

/// Identity of one relationship instance: the owning service and the
/// position of the relationship in that service's ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId {
    /// The service that owns the relationship.
    pub service: ServiceId,
    /// Position within the owner's relationship list.
    pub ordinal: u32,
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.service, self.ordinal)
    }
}

/// One child relationship of a business service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// What the relationship points at.
    pub target: RelationshipTarget,
    /// How the child's status feeds into the parent's.
    pub aggregation: AggregationToken,
}

impl Relationship {
    /// Create a relationship to another business service.
    pub fn to_service(child: impl Into<ServiceId>, aggregation: impl Into<AggregationToken>) -> Self {
        Self {
            target: RelationshipTarget::Service(child.into()),
            aggregation: aggregation.into(),
        }
    }

    /// Create a relationship to a monitored endpoint.
    pub fn to_endpoint(endpoint: EndpointRef, aggregation: impl Into<AggregationToken>) -> Self {
        Self {
            target: RelationshipTarget::Endpoint(endpoint),
            aggregation: aggregation.into(),
        }
    }

    /// The type tag derived from the target.
    pub fn kind(&self) -> RelationshipKind {
        match self.target {
            RelationshipTarget::Service(_) => RelationshipKind::ChildService,
            RelationshipTarget::Endpoint(_) => RelationshipKind::Endpoint,
        }
    }

    /// The child business service, if this relationship targets one.
    pub fn child_service(&self) -> Option<ServiceId> {
        match self.target {
            RelationshipTarget::Service(id) => Some(id),
            RelationshipTarget::Endpoint(_) => None,
        }
    }
}

/// A business service definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessService {
    /// Unique id within a snapshot.
    pub id: ServiceId,
    /// Display name.
    pub name: String,
    /// Ordered child relationships.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl BusinessService {
    /// Create a business service without children.
    pub fn new(id: impl Into<ServiceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            relationships: Vec::new(),
        }
    }

    /// Add a relationship to a child business service.
    pub fn with_child_service(
        mut self,
        child: impl Into<ServiceId>,
        aggregation: impl Into<AggregationToken>,
    ) -> Self {
        self.relationships.push(Relationship::to_service(child, aggregation));
        self
    }

    /// Add a relationship to a monitored endpoint.
    pub fn with_endpoint(mut self, endpoint: EndpointRef, aggregation: impl Into<AggregationToken>) -> Self {
        self.relationships.push(Relationship::to_endpoint(endpoint, aggregation));
        self
    }

    /// Relationships paired with their identities, in order.
    pub fn relationships_with_ids(&self) -> impl Iterator<Item = (RelationshipId, &Relationship)> + '_ {
        let service = self.id;
        self.relationships.iter().enumerate().map(move |(ordinal, rel)| {
            (
                RelationshipId {
                    service,
                    ordinal: ordinal as u32,
                },
                rel,
            )
        })
    }

    /// Ids of the business services this one depends on, in order.
    pub fn child_services(&self) -> impl Iterator<Item = ServiceId> + '_ {
        self.relationships.iter().filter_map(Relationship::child_service)
    }
}
