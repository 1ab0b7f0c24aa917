//! Commands for the Post context.

use bulletin_core::command::Command;
use uuid::Uuid;

/// Command to publish a new post.
#[derive(Debug, Clone)]
pub struct CreatePost {
    /// The new post's identifier, chosen by the caller.
    pub id: Uuid,
    /// User publishing the post.
    pub author: String,
    /// Initial message text.
    pub message: String,
}

impl Command for CreatePost {
    const NAME: &'static str = "post.create";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to replace a post's message text.
#[derive(Debug, Clone)]
pub struct EditMessage {
    /// The post to edit.
    pub id: Uuid,
    /// The new message text.
    pub message: String,
}

impl Command for EditMessage {
    const NAME: &'static str = "post.edit_message";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to like a post.
#[derive(Debug, Clone)]
pub struct LikePost {
    /// The post to like.
    pub id: Uuid,
}

impl Command for LikePost {
    const NAME: &'static str = "post.like";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to add a comment to a post.
#[derive(Debug, Clone)]
pub struct AddComment {
    /// The post to comment on.
    pub id: Uuid,
    /// Comment text.
    pub comment: String,
    /// User writing the comment.
    pub username: String,
}

impl Command for AddComment {
    const NAME: &'static str = "post.add_comment";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to rewrite an existing comment.
#[derive(Debug, Clone)]
pub struct EditComment {
    /// The post the comment belongs to.
    pub id: Uuid,
    /// The comment to rewrite.
    pub comment_id: Uuid,
    /// The new comment text.
    pub comment: String,
    /// User performing the edit.
    pub username: String,
}

impl Command for EditComment {
    const NAME: &'static str = "post.edit_comment";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to remove a comment.
#[derive(Debug, Clone)]
pub struct RemoveComment {
    /// The post the comment belongs to.
    pub id: Uuid,
    /// The comment to remove.
    pub comment_id: Uuid,
    /// User performing the removal.
    pub username: String,
}

impl Command for RemoveComment {
    const NAME: &'static str = "post.remove_comment";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}

/// Command to remove a post.
#[derive(Debug, Clone)]
pub struct DeletePost {
    /// The post to remove.
    pub id: Uuid,
    /// User requesting the removal.
    pub username: String,
}

impl Command for DeletePost {
    const NAME: &'static str = "post.delete";

    fn aggregate_id(&self) -> Uuid {
        self.id
    }
}
