//! Event-sourcing handler: load aggregates by replay, persist their changes.

use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::DomainError;
use crate::store::EventStore;

/// Loads aggregates by replaying their stream and saves their uncommitted
/// events back through the store.
pub struct EventSourcingHandler<A> {
    store: Arc<EventStore>,
    _aggregate: PhantomData<A>,
}

impl<A: Aggregate> EventSourcingHandler<A> {
    /// Creates a handler over the given store.
    #[must_use]
    pub fn new(store: Arc<EventStore>) -> Self {
        Self {
            store,
            _aggregate: PhantomData,
        }
    }

    /// Reconstructs the aggregate with the given id by replaying its
    /// stream.
    ///
    /// A missing stream is not an error at this layer: the result is a
    /// fresh aggregate carrying the requested id at version `-1`. Callers
    /// that require the aggregate to exist must check the state they get
    /// back.
    ///
    /// # Errors
    ///
    /// Decode failures ([`DomainError::UnknownEventType`],
    /// [`DomainError::Serialization`]) and repository failures propagate
    /// unchanged.
    pub async fn load(&self, aggregate_id: Uuid) -> Result<A, DomainError> {
        let mut aggregate = A::default();
        aggregate.set_aggregate_id(aggregate_id);

        let events = match self.store.get_events::<A>(aggregate_id).await {
            Ok(events) => events,
            Err(DomainError::AggregateNotFound(_)) => return Ok(aggregate),
            Err(error) => return Err(error),
        };

        aggregate.replay(events.iter().map(|committed| &committed.event));
        aggregate.set_version(events.last().map_or(-1, |committed| committed.version));

        Ok(aggregate)
    }

    /// Persists the aggregate's uncommitted events and marks them
    /// committed.
    ///
    /// The aggregate's version is the expected stream version for the
    /// optimistic concurrency check. It is not advanced on success; an
    /// aggregate instance is discarded after its command cycle and
    /// reloaded fresh for the next one.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ConcurrencyConflict`] unchanged when another
    /// writer appended since this aggregate was loaded. On any error the
    /// uncommitted events are left in place.
    pub async fn save(&self, aggregate: &mut A) -> Result<(), DomainError> {
        self.store
            .save_events::<A>(
                aggregate.aggregate_id(),
                aggregate.uncommitted_events(),
                aggregate.version(),
            )
            .await?;
        aggregate.clear_uncommitted_events();
        Ok(())
    }
}
