//! Domain events for the Post context.

use bulletin_core::event::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag for [`PostCreated`].
pub const POST_CREATED_EVENT_TYPE: &str = "post.created";
/// Kind tag for [`MessageUpdated`].
pub const MESSAGE_UPDATED_EVENT_TYPE: &str = "post.message_updated";
/// Kind tag for [`PostLiked`].
pub const POST_LIKED_EVENT_TYPE: &str = "post.liked";
/// Kind tag for [`CommentAdded`].
pub const COMMENT_ADDED_EVENT_TYPE: &str = "post.comment_added";
/// Kind tag for [`CommentUpdated`].
pub const COMMENT_UPDATED_EVENT_TYPE: &str = "post.comment_updated";
/// Kind tag for [`CommentRemoved`].
pub const COMMENT_REMOVED_EVENT_TYPE: &str = "post.comment_removed";
/// Kind tag for [`PostRemoved`].
pub const POST_REMOVED_EVENT_TYPE: &str = "post.removed";

/// Emitted when a new post is published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreated {
    /// The post identifier.
    pub id: Uuid,
    /// User who published the post.
    pub author: String,
    /// Initial message text.
    pub message: String,
    /// When the post was published.
    pub posted_at: DateTime<Utc>,
}

/// Emitted when a post's message text is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdated {
    /// The post identifier.
    pub id: Uuid,
    /// The new message text.
    pub message: String,
}

/// Emitted when a post receives a like.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLiked {
    /// The post identifier.
    pub id: Uuid,
}

/// Emitted when a comment is added to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAdded {
    /// The post identifier.
    pub id: Uuid,
    /// The new comment's identifier.
    pub comment_id: Uuid,
    /// Comment text.
    pub comment: String,
    /// User who wrote the comment.
    pub username: String,
    /// When the comment was written.
    pub commented_at: DateTime<Utc>,
}

/// Emitted when a comment's text is rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdated {
    /// The post identifier.
    pub id: Uuid,
    /// The edited comment's identifier.
    pub comment_id: Uuid,
    /// The new comment text.
    pub comment: String,
    /// User who edited the comment.
    pub username: String,
    /// When the comment was edited.
    pub edited_at: DateTime<Utc>,
}

/// Emitted when a comment is removed from a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRemoved {
    /// The post identifier.
    pub id: Uuid,
    /// The removed comment's identifier.
    pub comment_id: Uuid,
}

/// Emitted when a post is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRemoved {
    /// The post identifier.
    pub id: Uuid,
}

/// Event variants for the Post context.
///
/// The serde tags equal the storage kind tags, so a stored payload decodes
/// directly into this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PostEvent {
    /// A new post has been published.
    #[serde(rename = "post.created")]
    Created(PostCreated),
    /// The post's message text has been replaced.
    #[serde(rename = "post.message_updated")]
    MessageUpdated(MessageUpdated),
    /// The post has received a like.
    #[serde(rename = "post.liked")]
    Liked(PostLiked),
    /// A comment has been added.
    #[serde(rename = "post.comment_added")]
    CommentAdded(CommentAdded),
    /// A comment has been rewritten.
    #[serde(rename = "post.comment_updated")]
    CommentUpdated(CommentUpdated),
    /// A comment has been removed.
    #[serde(rename = "post.comment_removed")]
    CommentRemoved(CommentRemoved),
    /// The post has been removed.
    #[serde(rename = "post.removed")]
    Removed(PostRemoved),
}

impl DomainEvent for PostEvent {
    const EVENT_TYPES: &'static [&'static str] = &[
        POST_CREATED_EVENT_TYPE,
        MESSAGE_UPDATED_EVENT_TYPE,
        POST_LIKED_EVENT_TYPE,
        COMMENT_ADDED_EVENT_TYPE,
        COMMENT_UPDATED_EVENT_TYPE,
        COMMENT_REMOVED_EVENT_TYPE,
        POST_REMOVED_EVENT_TYPE,
    ];

    fn event_type(&self) -> &'static str {
        match self {
            PostEvent::Created(_) => POST_CREATED_EVENT_TYPE,
            PostEvent::MessageUpdated(_) => MESSAGE_UPDATED_EVENT_TYPE,
            PostEvent::Liked(_) => POST_LIKED_EVENT_TYPE,
            PostEvent::CommentAdded(_) => COMMENT_ADDED_EVENT_TYPE,
            PostEvent::CommentUpdated(_) => COMMENT_UPDATED_EVENT_TYPE,
            PostEvent::CommentRemoved(_) => COMMENT_REMOVED_EVENT_TYPE,
            PostEvent::Removed(_) => POST_REMOVED_EVENT_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn sample_events() -> Vec<PostEvent> {
        let id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        vec![
            PostEvent::Created(PostCreated {
                id,
                author: "alice".to_owned(),
                message: "hello".to_owned(),
                posted_at: at,
            }),
            PostEvent::MessageUpdated(MessageUpdated {
                id,
                message: "hello again".to_owned(),
            }),
            PostEvent::Liked(PostLiked { id }),
            PostEvent::CommentAdded(CommentAdded {
                id,
                comment_id,
                comment: "hi".to_owned(),
                username: "bob".to_owned(),
                commented_at: at,
            }),
            PostEvent::CommentUpdated(CommentUpdated {
                id,
                comment_id,
                comment: "hi there".to_owned(),
                username: "bob".to_owned(),
                edited_at: at,
            }),
            PostEvent::CommentRemoved(CommentRemoved { id, comment_id }),
            PostEvent::Removed(PostRemoved { id }),
        ]
    }

    #[test]
    fn test_serde_tag_matches_event_type_for_every_variant() {
        for event in sample_events() {
            // Act
            let value = serde_json::to_value(&event).unwrap();

            // Assert
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 1, "externally tagged event: {event:?}");
            assert!(
                object.contains_key(event.event_type()),
                "serde tag differs from kind tag for {event:?}"
            );
        }
    }

    #[test]
    fn test_every_kind_tag_is_declared() {
        for event in sample_events() {
            assert!(PostEvent::EVENT_TYPES.contains(&event.event_type()));
        }
    }

    #[test]
    fn test_payloads_round_trip_through_json() {
        for event in sample_events() {
            // Act
            let value = serde_json::to_value(&event).unwrap();
            let decoded: PostEvent = serde_json::from_value(value).unwrap();

            // Assert
            assert_eq!(decoded.event_type(), event.event_type());
        }
    }
}
