//! Event repository boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a single domain event.
///
/// `aggregate_id` and `version` together form the natural key: a healthy
/// store never holds two records with the same pair.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Type tag of the owning aggregate.
    pub aggregate_type: String,
    /// Position of this event in its aggregate's stream, 1-based.
    pub version: i64,
    /// Event kind tag, used to route deserialization.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Timestamp assigned when the record was appended.
    pub occurred_at: DateTime<Utc>,
}

/// Boundary to the underlying append-only storage.
///
/// Implementations return the records of an aggregate in insertion order
/// and append one record at a time, atomically. Version ordering,
/// concurrency control and version assignment are the event store's job,
/// not the repository's.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Loads all records for the given aggregate, in insertion order.
    async fn find_by_aggregate_id(
        &self,
        aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError>;

    /// Appends a single record.
    async fn append(&self, record: &StoredEvent) -> Result<(), DomainError>;
}
