//! Command handlers for the Post context.
//!
//! Application-level orchestration: load the aggregate, invoke the domain
//! operation, persist the resulting events. Creation is the exception and
//! builds a fresh aggregate instead of loading one.

use std::sync::Arc;

use tracing::debug;

use bulletin_core::clock::Clock;
use bulletin_core::dispatcher::CommandDispatcher;
use bulletin_core::error::DomainError;
use bulletin_core::handler::EventSourcingHandler;

use crate::domain::aggregates::Post;
use crate::domain::commands::{
    AddComment, CreatePost, DeletePost, EditComment, EditMessage, LikePost, RemoveComment,
};

/// Handles every Post command against the event-sourced store.
pub struct PostCommandHandler {
    event_sourcing: Arc<EventSourcingHandler<Post>>,
    clock: Arc<dyn Clock>,
}

impl PostCommandHandler {
    /// Creates a handler over the given event-sourcing handler and clock.
    #[must_use]
    pub fn new(event_sourcing: Arc<EventSourcingHandler<Post>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            event_sourcing,
            clock,
        }
    }

    /// Handles [`CreatePost`]: builds a fresh aggregate and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ConcurrencyConflict`] if events already
    /// exist under the chosen id.
    pub async fn handle_create_post(&self, command: CreatePost) -> Result<(), DomainError> {
        let mut post = Post::new(
            command.id,
            command.author,
            command.message,
            self.clock.as_ref(),
        );
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`EditMessage`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_edit_message(&self, command: EditMessage) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.edit_message(command.message)?;
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`LikePost`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_like_post(&self, command: LikePost) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.like()?;
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`AddComment`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_add_comment(&self, command: AddComment) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.add_comment(command.comment, command.username, self.clock.as_ref())?;
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`EditComment`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_edit_comment(&self, command: EditComment) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.edit_comment(
            command.comment_id,
            command.comment,
            command.username,
            self.clock.as_ref(),
        )?;
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`RemoveComment`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_remove_comment(&self, command: RemoveComment) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.remove_comment(command.comment_id, &command.username)?;
        self.event_sourcing.save(&mut post).await
    }

    /// Handles [`DeletePost`].
    ///
    /// # Errors
    ///
    /// Propagates domain-rule and store failures unchanged.
    pub async fn handle_delete_post(&self, command: DeletePost) -> Result<(), DomainError> {
        let mut post = self.event_sourcing.load(command.id).await?;
        post.delete(&command.username)?;
        self.event_sourcing.save(&mut post).await
    }
}

/// Registers a handler for every Post command on `dispatcher`.
///
/// One-time startup wiring; the dispatcher is shared immutably afterwards.
///
/// # Errors
///
/// Returns [`DomainError::DuplicateCommandHandler`] if any Post command
/// already has a handler.
pub fn register_post_handlers(
    dispatcher: &mut CommandDispatcher,
    handler: Arc<PostCommandHandler>,
) -> Result<(), DomainError> {
    let h = Arc::clone(&handler);
    dispatcher.register(move |command: CreatePost| {
        let h = Arc::clone(&h);
        async move { h.handle_create_post(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: EditMessage| {
        let h = Arc::clone(&h);
        async move { h.handle_edit_message(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: LikePost| {
        let h = Arc::clone(&h);
        async move { h.handle_like_post(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: AddComment| {
        let h = Arc::clone(&h);
        async move { h.handle_add_comment(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: EditComment| {
        let h = Arc::clone(&h);
        async move { h.handle_edit_comment(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: RemoveComment| {
        let h = Arc::clone(&h);
        async move { h.handle_remove_comment(command).await }
    })?;

    let h = Arc::clone(&handler);
    dispatcher.register(move |command: DeletePost| {
        let h = Arc::clone(&h);
        async move { h.handle_delete_post(command).await }
    })?;

    debug!("Registered {} Post command handlers", dispatcher.len());
    Ok(())
}
