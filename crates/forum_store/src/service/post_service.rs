//! Post use-case service.
//!
//! # Responsibility
//! - Provide post/category entry points for request handlers.
//! - Route post reactions through the reaction ledger.

use crate::model::post::{NewPost, Post, PostId};
use crate::model::reaction::{ReactionCounts, ReactionDirection, ReactionTarget, UserId};
use crate::repo::error::StoreResult;
use crate::repo::post_repo::{normalize_category, PostRepository};
use crate::repo::reaction_repo::ReactionLedger;

/// Use-case service over post storage and the reaction ledger.
pub struct PostService<P: PostRepository, L: ReactionLedger> {
    posts: P,
    reactions: L,
}

impl<P: PostRepository, L: ReactionLedger> PostService<P, L> {
    pub fn new(posts: P, reactions: L) -> Self {
        Self { posts, reactions }
    }

    /// Creates a post and returns the stored row, categories included.
    pub fn create_post(&self, post: &NewPost) -> StoreResult<Post> {
        let post_id = self.posts.create_post(post)?;
        self.posts.get_post(post_id)
    }

    pub fn get_post(&self, post_id: PostId) -> StoreResult<Post> {
        self.posts.get_post(post_id)
    }

    /// Lists posts, optionally restricted to one category.
    ///
    /// A blank category filter is treated as no filter.
    pub fn list_posts(&self, category: Option<&str>) -> StoreResult<Vec<Post>> {
        match category.and_then(normalize_category) {
            Some(name) => self.posts.list_posts_by_category(&name),
            None => self.posts.list_posts(),
        }
    }

    pub fn list_categories(&self) -> StoreResult<Vec<String>> {
        self.posts.list_categories()
    }

    pub fn delete_post(&self, post_id: PostId) -> StoreResult<()> {
        self.posts.delete_post(post_id)
    }

    /// Sets the user's reaction on a post and returns the new counts.
    pub fn react(
        &self,
        user_id: UserId,
        post_id: PostId,
        direction: ReactionDirection,
    ) -> StoreResult<ReactionCounts> {
        self.reactions
            .set_reaction(user_id, ReactionTarget::Post(post_id), direction)
    }
}
