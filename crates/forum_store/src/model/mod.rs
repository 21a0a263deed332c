//! Forum domain model.
//!
//! # Responsibility
//! - Define the records shared by repositories and services.
//! - Host the stateless validation rules applied before storage writes.
//!
//! # Invariants
//! - Identifiers are store-allocated integers and are never reused.
//! - Like/dislike counters on posts and comments mirror the reaction ledger.

pub mod comment;
pub mod notification;
pub mod post;
pub mod reaction;
pub mod validation;
