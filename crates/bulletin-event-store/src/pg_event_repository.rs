//! `PostgreSQL` implementation of the event repository boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use bulletin_core::error::DomainError;
use bulletin_core::repository::{EventRepository, StoredEvent};

/// PostgreSQL-backed event repository.
///
/// One row per event in `domain_events`. Inserts into an occupied
/// `(aggregate_id, version)` slot are rejected by the table's unique
/// constraint and surface as a concurrency conflict.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `domain_events` table.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    aggregate_id: Uuid,
    aggregate_type: String,
    version: i64,
    event_type: String,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            aggregate_id: row.aggregate_id,
            aggregate_type: row.aggregate_type,
            version: row.version,
            event_type: row.event_type,
            payload: row.payload,
            occurred_at: row.occurred_at,
        }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_by_aggregate_id(
        &self,
        aggregate_id: Uuid,
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT aggregate_id, aggregate_type, version, event_type, payload, occurred_at \
             FROM domain_events WHERE aggregate_id = $1 ORDER BY version",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            DomainError::Infrastructure(format!("failed to load events: {error}"))
        })?;

        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    async fn append(&self, record: &StoredEvent) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO domain_events \
             (aggregate_id, aggregate_type, version, event_type, payload, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.aggregate_id)
        .bind(&record.aggregate_type)
        .bind(record.version)
        .bind(&record.event_type)
        .bind(&record.payload)
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| map_append_error(record, &error))?;

        debug!(
            "Appended {} v{} for aggregate {}",
            record.event_type, record.version, record.aggregate_id
        );
        Ok(())
    }
}

/// Maps an insert failure. A unique violation on `(aggregate_id, version)`
/// means another writer already claimed this version slot.
fn map_append_error(record: &StoredEvent, error: &sqlx::Error) -> DomainError {
    let unique_violation = error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation());

    if unique_violation {
        DomainError::ConcurrencyConflict {
            aggregate_id: record.aggregate_id,
            expected: record.version - 1,
            actual: record.version,
        }
    } else {
        DomainError::Infrastructure(format!("failed to append event: {error}"))
    }
}
