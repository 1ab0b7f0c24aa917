//! Domain event abstraction.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait implemented by the event enum of each aggregate type.
///
/// A domain event is an immutable fact. The version at which it became
/// durable is not part of the event itself; it lives on the storage record
/// and is assigned by the event store at append time.
pub trait DomainEvent: Clone + Debug + Serialize + DeserializeOwned + Send + Sync {
    /// The closed set of kind tags this event type can carry.
    ///
    /// Declared up front so the store can tell an unknown kind apart from a
    /// malformed payload when decoding stored records.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the kind tag of this event, used as the storage tag.
    fn event_type(&self) -> &'static str;
}
