//! Comment domain model.

use crate::model::post::PostId;
use serde::{Deserialize, Serialize};

pub type CommentId = i64;

/// One comment attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: String,
    pub text: String,
    /// Cached count of `like` reactions on this comment.
    pub likes: i64,
    /// Cached count of `dislike` reactions on this comment.
    pub dislikes: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Set by single-row lookup when the row was found. Not persisted and
    /// carries no authentication meaning.
    #[serde(skip)]
    pub found: bool,
}

impl Comment {
    /// Builds an update request that replaces the text of comment `id`.
    ///
    /// Only `id` and `text` are read by the update path.
    pub fn text_update(id: CommentId, text: impl Into<String>) -> Self {
        Self {
            id,
            post_id: 0,
            author: String::new(),
            text: text.into(),
            likes: 0,
            dislikes: 0,
            created_at: 0,
            found: false,
        }
    }
}
