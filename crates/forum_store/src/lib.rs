//! Transactional content store for a discussion forum.
//! This crate is the single source of truth for content invariants:
//! cascading deletes and reaction counters.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::comment::{Comment, CommentId};
pub use model::notification::{Notification, NotificationId};
pub use model::post::{NewPost, Post, PostId};
pub use model::reaction::{Reaction, ReactionCounts, ReactionDirection, ReactionTarget, UserId};
pub use model::validation::{validate_text, ValidationError};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::error::{EntityRef, StoreError, StoreResult};
pub use repo::notification_repo::{NotificationSink, SqliteNotificationSink};
pub use repo::post_repo::{PostRepository, SqlitePostRepository};
pub use repo::reaction_repo::{ReactionLedger, SqliteReactionLedger};
pub use service::comment_service::CommentService;
pub use service::post_service::PostService;

/// Minimal health-check API for caller wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the store crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
