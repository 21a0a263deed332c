//! Reaction ledger model.
//!
//! # Invariants
//! - A reaction targets exactly one post or exactly one comment.
//! - `ReactionDirection::None` is never stored; it means "no row".

use crate::model::comment::CommentId;
use crate::model::post::PostId;
use serde::{Deserialize, Serialize};

/// Identity of a reacting user, resolved upstream by the caller.
pub type UserId = i64;

/// Content a reaction points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}

impl ReactionTarget {
    /// Table that owns the target row and its cached counters.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Post(_) => "post",
            Self::Comment(_) => "comment",
        }
    }

    /// Reaction column that references the target.
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Post(_) => "post_id",
            Self::Comment(_) => "comment_id",
        }
    }

    pub(crate) fn id(self) -> i64 {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }
}

/// A user's stance on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionDirection {
    Like,
    Dislike,
    /// Withdraws any previous reaction.
    None,
}

impl ReactionDirection {
    /// Stored column value, `None` for the withdrawn state.
    pub(crate) fn to_db(self) -> Option<&'static str> {
        match self {
            Self::Like => Some("like"),
            Self::Dislike => Some("dislike"),
            Self::None => None,
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "like" => Some(Self::Like),
            "dislike" => Some(Self::Dislike),
            _ => None,
        }
    }
}

/// One active ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub user_id: UserId,
    pub target: ReactionTarget,
    pub direction: ReactionDirection,
}

/// Aggregate ledger counts for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

impl ReactionCounts {
    pub fn new(likes: i64, dislikes: i64) -> Self {
        Self { likes, dislikes }
    }
}
