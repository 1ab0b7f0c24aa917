//! Event store: version assignment and optimistic concurrency control.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::clock::Clock;
use crate::error::DomainError;
use crate::event::DomainEvent;
use crate::repository::{EventRepository, StoredEvent};

/// An event decoded from storage together with the version at which it was
/// committed.
#[derive(Debug, Clone)]
pub struct CommittedEvent<E> {
    /// Stream position assigned when the event was appended.
    pub version: i64,
    /// The decoded domain event.
    pub event: E,
}

/// Append-only event store over an [`EventRepository`].
///
/// The store owns the two stream-level rules: versions are assigned
/// sequentially at append time, and a write against a stale expected
/// version is rejected rather than interleaved. One store serves every
/// aggregate type; streams are independent per aggregate id.
pub struct EventStore {
    repository: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    /// Creates an event store over the given repository and clock.
    #[must_use]
    pub fn new(repository: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Loads and decodes the full stream for `aggregate_id`, ordered by
    /// version ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AggregateNotFound`] if the stream is empty,
    /// [`DomainError::UnknownEventType`] if a record carries a kind tag
    /// outside the aggregate's event set, and
    /// [`DomainError::Serialization`] if a payload fails to decode.
    pub async fn get_events<A: Aggregate>(
        &self,
        aggregate_id: Uuid,
    ) -> Result<Vec<CommittedEvent<A::Event>>, DomainError> {
        let mut records = self.repository.find_by_aggregate_id(aggregate_id).await?;

        if records.is_empty() {
            return Err(DomainError::AggregateNotFound(aggregate_id));
        }

        records.sort_by_key(|record| record.version);

        let mut events = Vec::with_capacity(records.len());
        for record in records {
            events.push(CommittedEvent {
                version: record.version,
                event: decode::<A>(record)?,
            });
        }

        debug!(
            "Loaded {} events for aggregate {aggregate_id}",
            events.len()
        );
        Ok(events)
    }

    /// Appends `events` to the stream for `aggregate_id`, assigning
    /// versions sequentially after `expected_version`.
    ///
    /// `expected_version` is the last stream version the writer observed,
    /// `-1` for a brand-new aggregate. The first event of a stream gets
    /// version 1. An empty `events` slice still runs the concurrency check
    /// but appends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ConcurrencyConflict`] if the stream's actual
    /// last version differs from `expected_version`, including the case
    /// where a writer expects a fresh stream and one already exists.
    /// Serialization and repository failures propagate unchanged.
    pub async fn save_events<A: Aggregate>(
        &self,
        aggregate_id: Uuid,
        events: &[A::Event],
        expected_version: i64,
    ) -> Result<(), DomainError> {
        let records = self.repository.find_by_aggregate_id(aggregate_id).await?;

        let actual = records.last().map_or(-1, |record| record.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        // Versions are 1-based, so a fresh stream (expected -1) starts at 1.
        let mut version = expected_version.max(0);
        for event in events {
            version += 1;
            let record = StoredEvent {
                aggregate_id,
                aggregate_type: A::AGGREGATE_TYPE.to_owned(),
                version,
                event_type: event.event_type().to_owned(),
                payload: serde_json::to_value(event)?,
                occurred_at: self.clock.now(),
            };
            self.repository.append(&record).await?;
        }

        debug!(
            "Appended {} events for aggregate {aggregate_id}, stream now at version {version}",
            events.len()
        );
        Ok(())
    }
}

/// Decodes one stored record into the aggregate's event type.
fn decode<A: Aggregate>(record: StoredEvent) -> Result<A::Event, DomainError> {
    if !A::Event::EVENT_TYPES.contains(&record.event_type.as_str()) {
        return Err(DomainError::UnknownEventType {
            aggregate_type: A::AGGREGATE_TYPE,
            event_type: record.event_type,
        });
    }
    Ok(serde_json::from_value(record.payload)?)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::{CommittedEvent, EventStore};
    use crate::aggregate::test_fixtures::{
        TALLY_BUMPED_EVENT_TYPE, TALLY_OPENED_EVENT_TYPE, Tally, TallyEvent,
    };
    use crate::clock::Clock;
    use crate::error::DomainError;
    use crate::event::DomainEvent;
    use crate::repository::{EventRepository, StoredEvent};

    #[derive(Default)]
    struct MemoryRepository {
        records: Mutex<Vec<StoredEvent>>,
    }

    impl MemoryRepository {
        fn seed(&self, record: StoredEvent) {
            self.records.lock().unwrap().push(record);
        }

        fn all(&self) -> Vec<StoredEvent> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventRepository for MemoryRepository {
        async fn find_by_aggregate_id(
            &self,
            aggregate_id: Uuid,
        ) -> Result<Vec<StoredEvent>, DomainError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|record| record.aggregate_id == aggregate_id)
                .cloned()
                .collect())
        }

        async fn append(&self, record: &StoredEvent) -> Result<(), DomainError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn store_over(repository: Arc<MemoryRepository>) -> EventStore {
        EventStore::new(repository, Arc::new(FixedClock(fixed_instant())))
    }

    fn stored(aggregate_id: Uuid, version: i64, event: &TallyEvent) -> StoredEvent {
        StoredEvent {
            aggregate_id,
            aggregate_type: "tally".to_owned(),
            version,
            event_type: event.event_type().to_owned(),
            payload: serde_json::to_value(event).unwrap(),
            occurred_at: fixed_instant(),
        }
    }

    #[tokio::test]
    async fn test_save_events_assigns_one_based_sequential_versions() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let aggregate_id = Uuid::new_v4();
        let events = vec![
            TallyEvent::Opened { id: aggregate_id },
            TallyEvent::Bumped { amount: 2 },
        ];

        // Act
        let result = store.save_events::<Tally>(aggregate_id, &events, -1).await;

        // Assert
        assert!(result.is_ok());
        let records = repository.all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].version, 1);
        assert_eq!(records[0].aggregate_type, "tally");
        assert_eq!(records[0].event_type, TALLY_OPENED_EVENT_TYPE);
        assert_eq!(records[0].occurred_at, fixed_instant());
        assert_eq!(records[1].version, 2);
        assert_eq!(records[1].event_type, TALLY_BUMPED_EVENT_TYPE);
    }

    #[tokio::test]
    async fn test_save_events_continues_after_last_committed_version() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let aggregate_id = Uuid::new_v4();
        store
            .save_events::<Tally>(
                aggregate_id,
                &[
                    TallyEvent::Opened { id: aggregate_id },
                    TallyEvent::Bumped { amount: 1 },
                ],
                -1,
            )
            .await
            .unwrap();

        // Act
        let result = store
            .save_events::<Tally>(aggregate_id, &[TallyEvent::Bumped { amount: 7 }], 2)
            .await;

        // Assert
        assert!(result.is_ok());
        let records = repository.all();
        assert_eq!(records.last().unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_save_events_with_stale_version_is_rejected() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let aggregate_id = Uuid::new_v4();
        store
            .save_events::<Tally>(
                aggregate_id,
                &[
                    TallyEvent::Opened { id: aggregate_id },
                    TallyEvent::Bumped { amount: 1 },
                ],
                -1,
            )
            .await
            .unwrap();

        // Act
        let result = store
            .save_events::<Tally>(aggregate_id, &[TallyEvent::Bumped { amount: 9 }], 1)
            .await;

        // Assert
        match result {
            Err(DomainError::ConcurrencyConflict {
                aggregate_id: conflicted,
                expected,
                actual,
            }) => {
                assert_eq!(conflicted, aggregate_id);
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("expected concurrency conflict, got {other:?}"),
        }
        assert_eq!(repository.all().len(), 2);
    }

    #[tokio::test]
    async fn test_creating_twice_under_the_same_id_conflicts() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let aggregate_id = Uuid::new_v4();
        store
            .save_events::<Tally>(aggregate_id, &[TallyEvent::Opened { id: aggregate_id }], -1)
            .await
            .unwrap();

        // Act
        let result = store
            .save_events::<Tally>(aggregate_id, &[TallyEvent::Opened { id: aggregate_id }], -1)
            .await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict {
                expected: -1,
                actual: 1,
                ..
            })
        ));
        assert_eq!(repository.all().len(), 1);
    }

    #[tokio::test]
    async fn test_save_events_with_empty_slice_appends_nothing() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let aggregate_id = Uuid::new_v4();

        // Act
        let result = store.save_events::<Tally>(aggregate_id, &[], -1).await;

        // Assert
        assert!(result.is_ok());
        assert!(repository.all().is_empty());
    }

    #[tokio::test]
    async fn test_get_events_for_unknown_aggregate_is_not_found() {
        // Arrange
        let store = store_over(Arc::new(MemoryRepository::default()));
        let aggregate_id = Uuid::new_v4();

        // Act
        let result = store.get_events::<Tally>(aggregate_id).await;

        // Assert
        assert!(matches!(
            result,
            Err(DomainError::AggregateNotFound(id)) if id == aggregate_id
        ));
    }

    #[tokio::test]
    async fn test_get_events_orders_by_version() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let aggregate_id = Uuid::new_v4();
        repository.seed(stored(
            aggregate_id,
            2,
            &TallyEvent::Bumped { amount: 4 },
        ));
        repository.seed(stored(
            aggregate_id,
            1,
            &TallyEvent::Opened { id: aggregate_id },
        ));
        let store = store_over(repository);

        // Act
        let events = store.get_events::<Tally>(aggregate_id).await.unwrap();

        // Assert
        let versions: Vec<i64> = events.iter().map(|committed| committed.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert_eq!(
            events[0].event,
            TallyEvent::Opened { id: aggregate_id }
        );
    }

    #[tokio::test]
    async fn test_get_events_only_sees_the_requested_stream() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(Arc::clone(&repository));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store
            .save_events::<Tally>(first, &[TallyEvent::Opened { id: first }], -1)
            .await
            .unwrap();
        store
            .save_events::<Tally>(
                second,
                &[
                    TallyEvent::Opened { id: second },
                    TallyEvent::Bumped { amount: 1 },
                ],
                -1,
            )
            .await
            .unwrap();

        // Act
        let events = store.get_events::<Tally>(first).await.unwrap();

        // Assert
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 1);
    }

    #[tokio::test]
    async fn test_get_events_rejects_unknown_event_type() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let aggregate_id = Uuid::new_v4();
        repository.seed(StoredEvent {
            aggregate_id,
            aggregate_type: "tally".to_owned(),
            version: 1,
            event_type: "tally.exploded".to_owned(),
            payload: json!({ "tally.exploded": {} }),
            occurred_at: fixed_instant(),
        });
        let store = store_over(repository);

        // Act
        let result = store.get_events::<Tally>(aggregate_id).await;

        // Assert
        match result {
            Err(DomainError::UnknownEventType {
                aggregate_type,
                event_type,
            }) => {
                assert_eq!(aggregate_type, "tally");
                assert_eq!(event_type, "tally.exploded");
            }
            other => panic!("expected unknown event type, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_events_rejects_malformed_payload() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let aggregate_id = Uuid::new_v4();
        repository.seed(StoredEvent {
            aggregate_id,
            aggregate_type: "tally".to_owned(),
            version: 1,
            event_type: TALLY_BUMPED_EVENT_TYPE.to_owned(),
            payload: json!({ "tally.bumped": { "amount": "three" } }),
            occurred_at: fixed_instant(),
        });
        let store = store_over(repository);

        // Act
        let result = store.get_events::<Tally>(aggregate_id).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_round_trip_preserves_event_payloads() {
        // Arrange
        let repository = Arc::new(MemoryRepository::default());
        let store = store_over(repository);
        let aggregate_id = Uuid::new_v4();
        let events = vec![
            TallyEvent::Opened { id: aggregate_id },
            TallyEvent::Bumped { amount: 41 },
        ];
        store
            .save_events::<Tally>(aggregate_id, &events, -1)
            .await
            .unwrap();

        // Act
        let loaded: Vec<CommittedEvent<TallyEvent>> =
            store.get_events::<Tally>(aggregate_id).await.unwrap();

        // Assert
        let decoded: Vec<TallyEvent> = loaded.into_iter().map(|committed| committed.event).collect();
        assert_eq!(decoded, events);
    }
}
