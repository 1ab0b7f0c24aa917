//! Shared test mocks and utilities for the Bulletin command service.

mod clock;
mod repository;

pub use clock::FixedClock;
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
