//! In-memory implementation of the event repository boundary.
//!
//! Backs integration tests and local development without a database. The
//! unique `(aggregate_id, version)` rule enforced by the PostgreSQL schema
//! is enforced here too, so both adapters reject the same writes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use bulletin_core::error::DomainError;
use bulletin_core::repository::{EventRepository, StoredEvent};

/// Event repository backed by a process-local map of streams.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find_by_aggregate_id(
        &self,
        aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.lock().map_err(|_| poisoned())?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append(&self, record: &StoredEvent) -> Result<(), DomainError> {
        let mut streams = self.streams.lock().map_err(|_| poisoned())?;
        let stream = streams.entry(record.aggregate_id).or_default();

        if stream.iter().any(|stored| stored.version == record.version) {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id: record.aggregate_id,
                expected: record.version - 1,
                actual: stream.last().map_or(-1, |stored| stored.version),
            });
        }

        stream.push(record.clone());
        Ok(())
    }
}

fn poisoned() -> DomainError {
    DomainError::Infrastructure("event stream lock poisoned".to_owned())
}
