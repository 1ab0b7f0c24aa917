//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for command handling, aggregates and the event
/// store.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A command argument failed validation; no event was raised.
    #[error("invalid {field} for {operation} on aggregate {aggregate_id}: {reason}")]
    InvalidArgument {
        /// The aggregate the command targeted.
        aggregate_id: Uuid,
        /// The attempted operation.
        operation: &'static str,
        /// The offending argument.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The aggregate's current state forbids the attempted operation.
    #[error("cannot {operation} on aggregate {aggregate_id}: {reason}")]
    InvalidState {
        /// The aggregate the command targeted.
        aggregate_id: Uuid,
        /// The attempted operation.
        operation: &'static str,
        /// Which state rule was violated.
        reason: String,
    },

    /// The acting user does not own the targeted resource.
    #[error("user {username:?} may not {operation} on aggregate {aggregate_id}")]
    Unauthorized {
        /// The aggregate the command targeted.
        aggregate_id: Uuid,
        /// The attempted operation.
        operation: &'static str,
        /// The user who attempted it.
        username: String,
    },

    /// No events exist for the requested aggregate.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// The stream moved past the version the writer last observed.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate whose stream conflicted.
        aggregate_id: Uuid,
        /// The last version the writer observed.
        expected: i64,
        /// The actual last version of the stream.
        actual: i64,
    },

    /// A second handler was registered for the same command type.
    #[error("a handler is already registered for command {0}")]
    DuplicateCommandHandler(&'static str),

    /// A command was dispatched with no registered handler.
    #[error("no handler registered for command {0}")]
    MissingCommandHandler(&'static str),

    /// A stored record carries a kind tag the aggregate type cannot apply.
    #[error("aggregate type {aggregate_type} cannot apply events of type {event_type}")]
    UnknownEventType {
        /// The aggregate type whose stream held the record.
        aggregate_type: &'static str,
        /// The unrecognized kind tag.
        event_type: String,
    },

    /// An event payload failed to serialize or deserialize.
    #[error("event payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A storage or wiring failure outside the domain.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
