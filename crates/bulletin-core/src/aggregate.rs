//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that reconstitute from event history.
///
/// `Default` must produce the empty pre-history state: nil identity,
/// version `-1`, no uncommitted events. All business state is derived by
/// folding events through [`apply`](Aggregate::apply). Business methods
/// never mutate fields directly; they validate against current state and
/// then [`raise`](Aggregate::raise) an event whose application performs
/// the mutation. Live state and replayed state stay identical by
/// construction.
pub trait Aggregate: Default + Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Tag identifying this aggregate type on storage records.
    const AGGREGATE_TYPE: &'static str;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Sets the aggregate identifier. The loader calls this before replay
    /// so that errors raised against an empty aggregate still carry the
    /// requested id.
    fn set_aggregate_id(&mut self, aggregate_id: Uuid);

    /// Returns the highest committed stream version reflected in state.
    ///
    /// `-1` means no events have been committed for this aggregate yet.
    fn version(&self) -> i64;

    /// Sets the version. The loader calls this after replay.
    fn set_version(&mut self, version: i64);

    /// Applies an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns the events raised since construction or load, oldest first.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Mutable access to the uncommitted event list, used by
    /// [`raise`](Aggregate::raise) for bookkeeping.
    fn uncommitted_events_mut(&mut self) -> &mut Vec<Self::Event>;

    /// Clears the uncommitted event list once the events are durable.
    fn clear_uncommitted_events(&mut self);

    /// Applies `event` to state and records it as an uncommitted change.
    fn raise(&mut self, event: Self::Event) {
        self.apply(&event);
        self.uncommitted_events_mut().push(event);
    }

    /// Applies already-durable events in order without recording them.
    fn replay<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        for event in events {
            self.apply(event);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use super::Aggregate;
    use crate::event::DomainEvent;

    pub(crate) const TALLY_OPENED_EVENT_TYPE: &str = "tally.opened";
    pub(crate) const TALLY_BUMPED_EVENT_TYPE: &str = "tally.bumped";

    /// Minimal event type used by the core test suites.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub(crate) enum TallyEvent {
        #[serde(rename = "tally.opened")]
        Opened { id: Uuid },
        #[serde(rename = "tally.bumped")]
        Bumped { amount: u32 },
    }

    impl DomainEvent for TallyEvent {
        const EVENT_TYPES: &'static [&'static str] =
            &[TALLY_OPENED_EVENT_TYPE, TALLY_BUMPED_EVENT_TYPE];

        fn event_type(&self) -> &'static str {
            match self {
                TallyEvent::Opened { .. } => TALLY_OPENED_EVENT_TYPE,
                TallyEvent::Bumped { .. } => TALLY_BUMPED_EVENT_TYPE,
            }
        }
    }

    /// Minimal aggregate used by the core test suites.
    #[derive(Debug)]
    pub(crate) struct Tally {
        pub(crate) id: Uuid,
        pub(crate) version: i64,
        pub(crate) total: u32,
        pub(crate) uncommitted_events: Vec<TallyEvent>,
    }

    impl Default for Tally {
        fn default() -> Self {
            Self {
                id: Uuid::nil(),
                version: -1,
                total: 0,
                uncommitted_events: Vec::new(),
            }
        }
    }

    impl Tally {
        pub(crate) fn open(id: Uuid) -> Self {
            let mut tally = Self::default();
            tally.raise(TallyEvent::Opened { id });
            tally
        }

        pub(crate) fn bump(&mut self, amount: u32) {
            self.raise(TallyEvent::Bumped { amount });
        }
    }

    impl Aggregate for Tally {
        type Event = TallyEvent;

        const AGGREGATE_TYPE: &'static str = "tally";

        fn aggregate_id(&self) -> Uuid {
            self.id
        }

        fn set_aggregate_id(&mut self, aggregate_id: Uuid) {
            self.id = aggregate_id;
        }

        fn version(&self) -> i64 {
            self.version
        }

        fn set_version(&mut self, version: i64) {
            self.version = version;
        }

        fn apply(&mut self, event: &Self::Event) {
            match event {
                TallyEvent::Opened { id } => self.id = *id,
                TallyEvent::Bumped { amount } => self.total += amount,
            }
        }

        fn uncommitted_events(&self) -> &[Self::Event] {
            &self.uncommitted_events
        }

        fn uncommitted_events_mut(&mut self) -> &mut Vec<Self::Event> {
            &mut self.uncommitted_events
        }

        fn clear_uncommitted_events(&mut self) {
            self.uncommitted_events.clear();
        }
    }
}
