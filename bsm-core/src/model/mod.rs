//! Service Definition Model
//!
//! Immutable input types for the graph engine. The configuration layer owns
//! business service definitions and hands a consistent [`ServiceSnapshot`]
//! to the engine for every rebuild.
//!
//! A [`BusinessService`] has an ordered list of [`Relationship`]s. Each
//! relationship points either at another business service or at a monitored
//! endpoint, and carries an opaque [`AggregationToken`] naming the function
//! that folds the child's status into the parent's.

mod service;
mod snapshot;

pub use service::{
    AggregationToken, BusinessService, EndpointRef, Relationship, RelationshipId, RelationshipKind,
    RelationshipTarget, ServiceId,
};
pub use snapshot::ServiceSnapshot;
