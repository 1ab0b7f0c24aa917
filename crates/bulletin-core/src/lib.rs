//! Bulletin Core — shared event-sourcing abstractions.
//!
//! This crate defines the machinery every bounded context depends on: the
//! aggregate and event traits, the event store with optimistic concurrency
//! control, the event-sourcing load/save handler, and the command
//! dispatcher. Persistence adapters live in `bulletin-event-store`.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod repository;
pub mod store;
