//! Command dispatcher: routes commands to handlers by concrete type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::command::Command;
use crate::error::DomainError;

/// A command boxed for dispatch, retaining its name for error reporting.
pub struct BoxedCommand {
    name: &'static str,
    command: Box<dyn Any + Send>,
}

impl BoxedCommand {
    /// Returns the name of the boxed command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Downcasts to the concrete command type.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Infrastructure`] if the box holds a
    /// different command type. That cannot happen through
    /// [`CommandDispatcher::dispatch`], which selects the handler by the
    /// command's own `TypeId`.
    pub fn downcast<C: Command>(self) -> Result<C, DomainError> {
        self.command.downcast().map(|command| *command).map_err(|_| {
            DomainError::Infrastructure(format!("command downcast failed for {}", C::NAME))
        })
    }
}

impl<C: Command> From<C> for BoxedCommand {
    fn from(command: C) -> Self {
        Self {
            name: C::NAME,
            command: Box::new(command),
        }
    }
}

type BoxedCommandFuture = Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send>>;
type BoxedCommandHandler = Box<dyn Fn(BoxedCommand) -> BoxedCommandFuture + Send + Sync>;

/// Routing table from concrete command types to their handlers.
///
/// Registration is a one-time startup step: build the dispatcher mutably,
/// register every handler, then share it immutably, typically behind an
/// `Arc`. There is no re-registration path at runtime.
#[derive(Default)]
pub struct CommandDispatcher {
    handlers: HashMap<TypeId, BoxedCommandHandler>,
}

impl CommandDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` as the single handler for command type `C`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DuplicateCommandHandler`] if a handler is
    /// already registered for `C`.
    pub fn register<C, F, Fut>(&mut self, handler: F) -> Result<(), DomainError>
    where
        C: Command,
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
    {
        if self.handlers.contains_key(&TypeId::of::<C>()) {
            return Err(DomainError::DuplicateCommandHandler(C::NAME));
        }

        let boxed: BoxedCommandHandler =
            Box::new(move |command: BoxedCommand| -> BoxedCommandFuture {
                match command.downcast::<C>() {
                    Ok(command) => Box::pin(handler(command)),
                    Err(error) => Box::pin(async move { Err(error) }),
                }
            });
        self.handlers.insert(TypeId::of::<C>(), boxed);
        Ok(())
    }

    /// Routes `command` to its registered handler and awaits it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MissingCommandHandler`] if no handler is
    /// registered for `C`; otherwise propagates whatever the handler
    /// returns.
    pub async fn dispatch<C: Command>(&self, command: C) -> Result<(), DomainError> {
        let handler = self
            .handlers
            .get(&TypeId::of::<C>())
            .ok_or(DomainError::MissingCommandHandler(C::NAME))?;

        debug!(
            "Dispatching {} for aggregate {}",
            C::NAME,
            command.aggregate_id()
        );
        handler(BoxedCommand::from(command)).await
    }

    /// Number of registered command types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
