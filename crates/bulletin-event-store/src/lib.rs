//! Bulletin Event Store — persistence adapters for the event repository
//! boundary.
//!
//! Two implementations of `EventRepository`: [`PgEventRepository`] for
//! production and [`InMemoryEventRepository`] for tests and local
//! development. [`schema::apply`] initializes the PostgreSQL schema at
//! service startup.

pub mod memory_event_repository;
pub mod pg_event_repository;
pub mod schema;

pub use memory_event_repository::InMemoryEventRepository;
pub use pg_event_repository::PgEventRepository;
