//! Aggregate roots for the Post context.

use std::collections::HashMap;

use bulletin_core::aggregate::Aggregate;
use bulletin_core::clock::Clock;
use bulletin_core::error::DomainError;
use uuid::Uuid;

use super::events::{
    CommentAdded, CommentRemoved, CommentUpdated, MessageUpdated, PostCreated, PostEvent,
    PostLiked, PostRemoved,
};

/// A comment on a post, as tracked by the write side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text.
    pub text: String,
    /// User who wrote the comment.
    pub author: String,
}

/// The aggregate root for a post.
///
/// State holds only what the business rules consult: the active flag, the
/// post author and the comments. Message text and like counts are facts
/// for the read side and are not tracked here. Business methods validate
/// against current state and raise exactly one event each; all mutation
/// happens in [`Aggregate::apply`].
#[derive(Debug)]
pub struct Post {
    id: Uuid,
    version: i64,
    active: bool,
    author: String,
    comments: HashMap<Uuid, Comment>,
    uncommitted_events: Vec<PostEvent>,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            version: -1,
            active: false,
            author: String::new(),
            comments: HashMap::new(),
            uncommitted_events: Vec::new(),
        }
    }
}

impl Post {
    /// Publishes a new post.
    #[must_use]
    pub fn new(id: Uuid, author: String, message: String, clock: &dyn Clock) -> Self {
        let mut post = Self::default();
        post.raise(PostEvent::Created(PostCreated {
            id,
            author,
            message,
            posted_at: clock.now(),
        }));
        post
    }

    /// Whether the post is active (has been created and not removed).
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// The user who published the post.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// The comments on the post, keyed by comment id.
    #[must_use]
    pub fn comments(&self) -> &HashMap<Uuid, Comment> {
        &self.comments
    }

    /// Replaces the message text of an active post.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is inactive and
    /// [`DomainError::InvalidArgument`] if `message` is empty or
    /// whitespace-only.
    pub fn edit_message(&mut self, message: String) -> Result<(), DomainError> {
        self.ensure_active("edit message")?;
        ensure_text(self.id, "edit message", "message", &message)?;

        self.raise(PostEvent::MessageUpdated(MessageUpdated {
            id: self.id,
            message,
        }));
        Ok(())
    }

    /// Records a like on an active post. Likes are anonymous and
    /// unbounded; the same caller may like a post repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is inactive.
    pub fn like(&mut self) -> Result<(), DomainError> {
        self.ensure_active("like post")?;

        self.raise(PostEvent::Liked(PostLiked { id: self.id }));
        Ok(())
    }

    /// Adds a comment under a freshly generated comment id.
    ///
    /// The id rides in the event, so replay reproduces the same comment id
    /// even though generation itself is not deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is inactive and
    /// [`DomainError::InvalidArgument`] if `comment` is empty or
    /// whitespace-only.
    pub fn add_comment(
        &mut self,
        comment: String,
        username: String,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active("add comment")?;
        ensure_text(self.id, "add comment", "comment", &comment)?;

        self.raise(PostEvent::CommentAdded(CommentAdded {
            id: self.id,
            comment_id: Uuid::new_v4(),
            comment,
            username,
            commented_at: clock.now(),
        }));
        Ok(())
    }

    /// Rewrites a comment. Only the comment's author may edit it; the
    /// comparison ignores case.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is inactive,
    /// [`DomainError::InvalidArgument`] if no comment has `comment_id`,
    /// and [`DomainError::Unauthorized`] if `username` is not the
    /// comment's author.
    pub fn edit_comment(
        &mut self,
        comment_id: Uuid,
        comment: String,
        username: String,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_active("edit comment")?;
        self.ensure_comment_author(comment_id, "edit comment", &username)?;

        self.raise(PostEvent::CommentUpdated(CommentUpdated {
            id: self.id,
            comment_id,
            comment,
            username,
            edited_at: clock.now(),
        }));
        Ok(())
    }

    /// Removes a comment. Only the comment's author may remove it; the
    /// comparison ignores case.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is inactive,
    /// [`DomainError::InvalidArgument`] if no comment has `comment_id`,
    /// and [`DomainError::Unauthorized`] if `username` is not the
    /// comment's author.
    pub fn remove_comment(&mut self, comment_id: Uuid, username: &str) -> Result<(), DomainError> {
        self.ensure_active("remove comment")?;
        self.ensure_comment_author(comment_id, "remove comment", username)?;

        self.raise(PostEvent::CommentRemoved(CommentRemoved {
            id: self.id,
            comment_id,
        }));
        Ok(())
    }

    /// Deactivates the post. Only the post's author may delete it; the
    /// comparison ignores case.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] if the post is already
    /// removed and [`DomainError::Unauthorized`] if `username` is not the
    /// post's author.
    pub fn delete(&mut self, username: &str) -> Result<(), DomainError> {
        if !self.active {
            return Err(DomainError::InvalidState {
                aggregate_id: self.id,
                operation: "delete post",
                reason: "the post has already been removed".to_owned(),
            });
        }
        if !eq_ignore_case(&self.author, username) {
            return Err(DomainError::Unauthorized {
                aggregate_id: self.id,
                operation: "delete post",
                username: username.to_owned(),
            });
        }

        self.raise(PostEvent::Removed(PostRemoved { id: self.id }));
        Ok(())
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), DomainError> {
        if self.active {
            Ok(())
        } else {
            Err(DomainError::InvalidState {
                aggregate_id: self.id,
                operation,
                reason: "the post is inactive".to_owned(),
            })
        }
    }

    fn ensure_comment_author(
        &self,
        comment_id: Uuid,
        operation: &'static str,
        username: &str,
    ) -> Result<(), DomainError> {
        let comment =
            self.comments
                .get(&comment_id)
                .ok_or_else(|| DomainError::InvalidArgument {
                    aggregate_id: self.id,
                    operation,
                    field: "comment_id",
                    reason: format!("no comment with id {comment_id}"),
                })?;

        if eq_ignore_case(&comment.author, username) {
            Ok(())
        } else {
            Err(DomainError::Unauthorized {
                aggregate_id: self.id,
                operation,
                username: username.to_owned(),
            })
        }
    }
}

fn ensure_text(
    aggregate_id: Uuid,
    operation: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidArgument {
            aggregate_id,
            operation,
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

impl Aggregate for Post {
    type Event = PostEvent;

    const AGGREGATE_TYPE: &'static str = "post";

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
            PostEvent::Created(payload) => {
                self.id = payload.id;
                self.active = true;
                self.author = payload.author.clone();
            }
            // Message text and like counts are read-side facts; the write
            // side has no rule that consults them.
            PostEvent::MessageUpdated(_) | PostEvent::Liked(_) => {}
            PostEvent::CommentAdded(payload) => {
                self.comments.insert(
                    payload.comment_id,
                    Comment {
                        text: payload.comment.clone(),
                        author: payload.username.clone(),
                    },
                );
            }
            PostEvent::CommentUpdated(payload) => {
                self.comments.insert(
                    payload.comment_id,
                    Comment {
                        text: payload.comment.clone(),
                        author: payload.username.clone(),
                    },
                );
            }
            PostEvent::CommentRemoved(payload) => {
                self.comments.remove(&payload.comment_id);
            }
            PostEvent::Removed(_) => {
                self.active = false;
            }
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
