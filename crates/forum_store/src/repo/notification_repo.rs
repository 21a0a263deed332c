//! Notification sink contract and SQLite implementation.
//!
//! # Responsibility
//! - Append "someone reacted to your content" events.
//! - Hard-delete events whose source comment goes away.
//!
//! # Invariants
//! - Rows are never edited except for the `active` read flag.
//! - A notification never references a comment that no longer exists.

use crate::model::comment::CommentId;
use crate::model::notification::{Notification, NotificationId};
use crate::model::post::PostId;
use crate::repo::error::{EntityRef, StorageContext, StoreError, StoreResult};
use crate::repo::{begin_immediate, ensure_connection_ready, row_exists};
use rusqlite::{params, Connection, Row};

/// Repository interface for reaction notifications.
pub trait NotificationSink {
    /// Appends one active notification and returns its id.
    fn record(
        &self,
        post_id: PostId,
        comment_id: Option<CommentId>,
        author: &str,
        react_author: &str,
        message: &str,
    ) -> StoreResult<NotificationId>;
    /// Deletes every notification sourced from the comment.
    fn invalidate_for_comment(&self, comment_id: CommentId) -> StoreResult<usize>;
    /// Lists active notifications addressed to `author`, newest first.
    fn list_active(&self, author: &str) -> StoreResult<Vec<Notification>>;
    /// Clears the active flag of one notification.
    fn mark_read(&self, notification_id: NotificationId) -> StoreResult<()>;
}

/// SQLite-backed notification sink.
pub struct SqliteNotificationSink<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationSink<'conn> {
    /// Constructs a sink from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NotificationSink for SqliteNotificationSink<'_> {
    fn record(
        &self,
        post_id: PostId,
        comment_id: Option<CommentId>,
        author: &str,
        react_author: &str,
        message: &str,
    ) -> StoreResult<NotificationId> {
        let tx = begin_immediate(self.conn).context("record_notification.begin")?;
        if !row_exists(&tx, "post", post_id).context("record_notification.lookup")? {
            return Err(StoreError::NotFound(EntityRef::Post(post_id)));
        }
        if let Some(comment_id) = comment_id {
            let belongs: i64 = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM comment WHERE id = ?1 AND post_id = ?2);",
                    params![comment_id, post_id],
                    |row| row.get(0),
                )
                .context("record_notification.lookup")?;
            if belongs != 1 {
                return Err(StoreError::NotFound(EntityRef::Comment(comment_id)));
            }
        }

        tx.execute(
            "INSERT INTO notification (post_id, comment_id, author, react_author, message)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![post_id, comment_id, author, react_author, message],
        )
        .context("record_notification.insert")?;
        let id = tx.last_insert_rowid();
        tx.commit().context("record_notification.commit")?;
        Ok(id)
    }

    fn invalidate_for_comment(&self, comment_id: CommentId) -> StoreResult<usize> {
        delete_for_comment(self.conn, comment_id).context("invalidate_notifications")
    }

    fn list_active(&self, author: &str) -> StoreResult<Vec<Notification>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, post_id, comment_id, author, react_author, message, active, created_at
                 FROM notification
                 WHERE author = ?1 AND active = 1
                 ORDER BY id DESC;",
            )
            .context("list_notifications")?;
        let mut rows = stmt.query([author]).context("list_notifications")?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().context("list_notifications")? {
            items.push(parse_notification_row(row).context("list_notifications")?);
        }
        Ok(items)
    }

    fn mark_read(&self, notification_id: NotificationId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE notification SET active = 0 WHERE id = ?1;",
                [notification_id],
            )
            .context("mark_notification_read")?;
        if changed == 0 {
            return Err(StoreError::NotFound(EntityRef::Notification(
                notification_id,
            )));
        }
        Ok(())
    }
}

/// Removes notifications sourced from one comment. Caller owns the transaction.
pub(crate) fn delete_for_comment(
    conn: &Connection,
    comment_id: CommentId,
) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM notification WHERE comment_id = ?1;",
        [comment_id],
    )
}

/// Removes notifications sourced from a post or any of its comments.
pub(crate) fn delete_for_post(conn: &Connection, post_id: PostId) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM notification
         WHERE post_id = ?1
            OR comment_id IN (SELECT id FROM comment WHERE post_id = ?1);",
        [post_id],
    )
}

fn parse_notification_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        comment_id: row.get("comment_id")?,
        author: row.get("author")?,
        react_author: row.get("react_author")?,
        message: row.get("message")?,
        // CHECK (active IN (0, 1)) in the schema.
        active: row.get::<_, i64>("active")? == 1,
        created_at: row.get("created_at")?,
    })
}
