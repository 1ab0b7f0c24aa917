//! Bulletin — Post bounded context.
//!
//! The write side of the social-media post domain: publishing posts,
//! editing and liking them, and managing their comments, all persisted as
//! event streams.

pub mod application;
pub mod domain;
