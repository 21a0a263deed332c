//! Comment use-case service.
//!
//! # Responsibility
//! - Provide comment entry points for request handlers.
//! - Route comment reactions through the reaction ledger.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/transaction contracts.
//! - Service layer remains storage-agnostic.

use crate::model::comment::{Comment, CommentId};
use crate::model::post::PostId;
use crate::model::reaction::{ReactionCounts, ReactionDirection, ReactionTarget, UserId};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::error::StoreResult;
use crate::repo::reaction_repo::ReactionLedger;

/// Use-case service over comment storage and the reaction ledger.
pub struct CommentService<C: CommentRepository, L: ReactionLedger> {
    comments: C,
    reactions: L,
}

impl<C: CommentRepository, L: ReactionLedger> CommentService<C, L> {
    pub fn new(comments: C, reactions: L) -> Self {
        Self {
            comments,
            reactions,
        }
    }

    /// Creates a comment; fails with `NotFound` for an unknown post.
    pub fn create_comment(
        &self,
        post_id: PostId,
        author: &str,
        text: &str,
    ) -> StoreResult<CommentId> {
        self.comments.create_comment(post_id, author, text)
    }

    pub fn get_comments_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        self.comments.get_comments_by_post(post_id)
    }

    pub fn get_comment(&self, comment_id: CommentId) -> StoreResult<Comment> {
        self.comments.get_comment(comment_id)
    }

    pub fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        self.comments.update_comment(comment)
    }

    /// Replaces the comment text and returns the stored row.
    pub fn edit_text(&self, comment_id: CommentId, text: &str) -> StoreResult<Comment> {
        self.comments
            .update_comment(&Comment::text_update(comment_id, text))?;
        self.comments.get_comment(comment_id)
    }

    pub fn delete_comment(&self, comment_id: CommentId) -> StoreResult<()> {
        self.comments.delete_comment(comment_id)
    }

    /// Sets the user's reaction on a comment and returns the new counts.
    pub fn react(
        &self,
        user_id: UserId,
        comment_id: CommentId,
        direction: ReactionDirection,
    ) -> StoreResult<ReactionCounts> {
        self.reactions
            .set_reaction(user_id, ReactionTarget::Comment(comment_id), direction)
    }
}
