//! Reaction notification model.

use crate::model::comment::CommentId;
use crate::model::post::PostId;
use serde::{Deserialize, Serialize};

pub type NotificationId = i64;

/// "Someone reacted to your content" event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub post_id: PostId,
    /// Present when the reaction targeted a comment rather than the post.
    pub comment_id: Option<CommentId>,
    /// Author of the content that was reacted to.
    pub author: String,
    /// User who reacted.
    pub react_author: String,
    pub message: String,
    pub active: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}
