//! Command abstraction.

use std::fmt::Debug;

use uuid::Uuid;

/// Trait that all commands implement.
///
/// A command is a request to perform one business operation against one
/// aggregate. Commands are routed to their handler by concrete type; the
/// name only appears in logs and dispatcher errors.
pub trait Command: Debug + Send + Sync + 'static {
    /// Unique name of the command.
    const NAME: &'static str;

    /// The aggregate this command targets.
    fn aggregate_id(&self) -> Uuid;
}
