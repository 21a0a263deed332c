//! Comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the comment lifecycle: create, read, text update, delete.
//! - Delete a comment together with its reactions and notifications.
//!
//! # Invariants
//! - Comment text is validated and stored trimmed.
//! - A comment can only be created under an existing post.
//! - `delete_comment` is all-or-nothing across `reaction`, `notification`
//!   and `comment`; no reader ever sees a partial cascade.

use crate::model::comment::{Comment, CommentId};
use crate::model::post::PostId;
use crate::model::validation::validate_text;
use crate::repo::error::{EntityRef, StorageContext, StoreError, StoreResult};
use crate::repo::{
    begin_immediate, ensure_connection_ready, notification_repo, reaction_repo, row_exists,
};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    post_id,
    author,
    text,
    likes,
    dislikes,
    created_at
FROM comment";

/// Repository interface for comment operations.
pub trait CommentRepository {
    /// Creates one comment under `post_id` and returns its id.
    fn create_comment(
        &self,
        post_id: PostId,
        author: &str,
        text: &str,
    ) -> StoreResult<CommentId>;
    /// Lists comments of one post in creation order.
    fn get_comments_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>>;
    /// Gets one comment by id.
    fn get_comment(&self, comment_id: CommentId) -> StoreResult<Comment>;
    /// Replaces the text of `comment.id` with `comment.text`.
    fn update_comment(&self, comment: &Comment) -> StoreResult<()>;
    /// Deletes the comment, its reactions and its notifications atomically.
    fn delete_comment(&self, comment_id: CommentId) -> StoreResult<()>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(
        &self,
        post_id: PostId,
        author: &str,
        text: &str,
    ) -> StoreResult<CommentId> {
        let text = validate_text(text)?;

        let tx = begin_immediate(self.conn).context("create_comment.begin")?;
        if !row_exists(&tx, "post", post_id).context("create_comment.lookup")? {
            return Err(StoreError::NotFound(EntityRef::Post(post_id)));
        }
        tx.execute(
            "INSERT INTO comment (post_id, author, text) VALUES (?1, ?2, ?3);",
            params![post_id, author, text],
        )
        .context("create_comment.insert")?;
        let comment_id = tx.last_insert_rowid();
        tx.commit().context("create_comment.commit")?;

        Ok(comment_id)
    }

    fn get_comments_by_post(&self, post_id: PostId) -> StoreResult<Vec<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{COMMENT_SELECT_SQL}
                 WHERE post_id = ?1
                 ORDER BY id ASC;"
            ))
            .context("list_comments")?;
        let mut rows = stmt.query([post_id]).context("list_comments")?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next().context("list_comments")? {
            comments.push(parse_comment_row(row).context("list_comments")?);
        }
        Ok(comments)
    }

    fn get_comment(&self, comment_id: CommentId) -> StoreResult<Comment> {
        let comment = self
            .conn
            .query_row(
                &format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"),
                [comment_id],
                parse_comment_row,
            )
            .optional()
            .context("get_comment")?;

        match comment {
            Some(mut comment) => {
                comment.found = true;
                Ok(comment)
            }
            None => Err(StoreError::NotFound(EntityRef::Comment(comment_id))),
        }
    }

    fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let text = validate_text(&comment.text)?;

        let changed = self
            .conn
            .execute(
                "UPDATE comment SET text = ?2 WHERE id = ?1;",
                params![comment.id, text],
            )
            .context("update_comment")?;
        if changed == 0 {
            return Err(StoreError::NotFound(EntityRef::Comment(comment.id)));
        }

        Ok(())
    }

    fn delete_comment(&self, comment_id: CommentId) -> StoreResult<()> {
        let started_at = Instant::now();
        match delete_comment_cascade(self.conn, comment_id) {
            Ok(removed) => {
                info!(
                    "event=comment_delete module=repo status=ok comment_id={} reactions_removed={} notifications_removed={} duration_ms={}",
                    comment_id,
                    removed.reactions,
                    removed.notifications,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err @ StoreError::NotFound(_)) => {
                info!(
                    "event=comment_delete module=repo status=not_found comment_id={comment_id}"
                );
                Err(err)
            }
            Err(err) => {
                error!(
                    "event=comment_delete module=repo status=error comment_id={} duration_ms={} error_code={} error={}",
                    comment_id,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

struct CascadeSummary {
    reactions: usize,
    notifications: usize,
}

/// Dependent rows go first so foreign keys never point at a missing comment,
/// even inside the transaction.
fn delete_comment_cascade(
    conn: &Connection,
    comment_id: CommentId,
) -> StoreResult<CascadeSummary> {
    let tx = begin_immediate(conn).context("delete_comment.begin")?;

    let reactions =
        reaction_repo::delete_for_comment(&tx, comment_id).context("delete_comment.reactions")?;
    let notifications = notification_repo::delete_for_comment(&tx, comment_id)
        .context("delete_comment.notifications")?;
    let changed = tx
        .execute("DELETE FROM comment WHERE id = ?1;", [comment_id])
        .context("delete_comment.comment")?;
    if changed == 0 {
        return Err(StoreError::NotFound(EntityRef::Comment(comment_id)));
    }

    tx.commit().context("delete_comment.commit")?;
    Ok(CascadeSummary {
        reactions,
        notifications,
    })
}

fn parse_comment_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        author: row.get("author")?,
        text: row.get("text")?,
        likes: row.get("likes")?,
        dislikes: row.get("dislikes")?,
        created_at: row.get("created_at")?,
        found: false,
    })
}
