//! Event store database schema.

use sqlx::PgPool;

use bulletin_core::error::DomainError;

/// SQL to create the events table.
///
/// The `UNIQUE (aggregate_id, version)` constraint is the storage-level
/// backstop for optimistic concurrency: two writers can never both claim
/// the same version slot, whatever the check above them concluded.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS domain_events (
    id              BIGSERIAL PRIMARY KEY,
    aggregate_id    UUID NOT NULL,
    aggregate_type  VARCHAR(255) NOT NULL,
    version         BIGINT NOT NULL,
    event_type      VARCHAR(255) NOT NULL,
    payload         JSONB NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL,
    UNIQUE (aggregate_id, version)
);

CREATE INDEX IF NOT EXISTS idx_domain_events_aggregate_id
    ON domain_events (aggregate_id, version);
";

/// Applies the event store schema. Idempotent; intended to run once at
/// service startup before the first repository call.
///
/// # Errors
///
/// Returns [`DomainError::Infrastructure`] if the DDL fails to execute.
pub async fn apply(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::raw_sql(CREATE_EVENTS_TABLE)
        .execute(pool)
        .await
        .map_err(|error| {
            DomainError::Infrastructure(format!("failed to apply event store schema: {error}"))
        })?;
    Ok(())
}
