//! Post and category domain model.

use serde::{Deserialize, Serialize};

pub type PostId = i64;

/// A forum post with its category tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub description: String,
    /// Opaque image reference (path or URL) chosen by the caller.
    pub image: Option<String>,
    /// Normalized category names, sorted.
    pub categories: Vec<String>,
    pub author: String,
    pub likes: i64,
    pub dislikes: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for post creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub author: String,
}
