//! Forum use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing entry points.
//! - Keep HTTP-facing callers decoupled from storage details.

pub mod comment_service;
pub mod post_service;
