//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bulletin_core::error::DomainError;
use bulletin_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that serves a fixed stream and records every
/// appended record. `find_by_aggregate_id` returns the configured stream
/// regardless of the requested id; `append` always succeeds.
#[derive(Debug)]
pub struct RecordingEventRepository {
    stream: Mutex<Vec<StoredEvent>>,
    appended: Mutex<Vec<StoredEvent>>,
}

impl RecordingEventRepository {
    /// Creates a repository that serves `stream` from every
    /// `find_by_aggregate_id` call.
    #[must_use]
    pub fn new(stream: Vec<StoredEvent>) -> Self {
        Self {
            stream: Mutex::new(stream),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all records that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn appended_records(&self) -> Vec<StoredEvent> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn find_by_aggregate_id(
        &self,
        _aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.stream.lock().unwrap().clone())
    }

    async fn append(&self, record: &StoredEvent) -> Result<(), DomainError> {
        self.appended.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// An event repository that always returns an empty stream and silently
/// accepts appends. Useful for "aggregate not found" scenarios and
/// creation commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn find_by_aggregate_id(
        &self,
        _aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append(&self, _record: &StoredEvent) -> Result<(), DomainError> {
        Ok(())
    }
}

/// An event repository that always returns an infrastructure error.
/// Useful for error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn find_by_aggregate_id(
        &self,
        _aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append(&self, _record: &StoredEvent) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
