//! Application services for the Post context.

pub mod command_handlers;
