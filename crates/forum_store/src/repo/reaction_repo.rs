//! Reaction ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Record each user's current like/dislike on a post or comment.
//! - Keep the cached counters on `post`/`comment` equal to ledger counts.
//!
//! # Invariants
//! - At most one row per (user, target), enforced by partial unique indexes.
//! - Every ledger write recomputes counts and refreshes the cached counters
//!   inside the same immediate transaction.
//! - Writers on one database serialize on the write lock, so concurrent
//!   reactions from distinct users are never lost or double counted.

use crate::model::comment::CommentId;
use crate::model::post::PostId;
use crate::model::reaction::{Reaction, ReactionCounts, ReactionDirection, ReactionTarget, UserId};
use crate::repo::error::{StorageContext, StoreError, StoreResult};
use crate::repo::{begin_immediate, ensure_connection_ready, row_exists};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the reaction ledger.
pub trait ReactionLedger {
    /// Sets (or withdraws, with `ReactionDirection::None`) the user's reaction
    /// and returns freshly recomputed counts for the target.
    fn set_reaction(
        &self,
        user_id: UserId,
        target: ReactionTarget,
        direction: ReactionDirection,
    ) -> StoreResult<ReactionCounts>;
    /// Returns the user's active reaction on the target, if any.
    fn get_reaction(
        &self,
        user_id: UserId,
        target: ReactionTarget,
    ) -> StoreResult<Option<Reaction>>;
    /// Counts ledger rows for the target without writing anything.
    fn counts(&self, target: ReactionTarget) -> StoreResult<ReactionCounts>;
}

/// SQLite-backed reaction ledger.
pub struct SqliteReactionLedger<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReactionLedger<'conn> {
    /// Constructs a ledger from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ReactionLedger for SqliteReactionLedger<'_> {
    fn set_reaction(
        &self,
        user_id: UserId,
        target: ReactionTarget,
        direction: ReactionDirection,
    ) -> StoreResult<ReactionCounts> {
        let result = write_reaction(self.conn, user_id, target, direction);
        match &result {
            Ok(counts) => debug!(
                "event=reaction_set module=repo status=ok target={} target_id={} likes={} dislikes={}",
                target.table(),
                target.id(),
                counts.likes,
                counts.dislikes
            ),
            Err(StoreError::NotFound(_)) => debug!(
                "event=reaction_set module=repo status=not_found target={} target_id={}",
                target.table(),
                target.id()
            ),
            Err(err) => error!(
                "event=reaction_set module=repo status=error target={} target_id={} error_code={} error={}",
                target.table(),
                target.id(),
                err.code(),
                err
            ),
        }
        result
    }

    fn get_reaction(
        &self,
        user_id: UserId,
        target: ReactionTarget,
    ) -> StoreResult<Option<Reaction>> {
        let stored: Option<String> = self
            .conn
            .query_row(
                &format!(
                    "SELECT direction FROM reaction WHERE user_id = ?1 AND {} = ?2;",
                    target.column()
                ),
                params![user_id, target.id()],
                |row| row.get(0),
            )
            .optional()
            .context("get_reaction")?;

        stored
            .map(|value| {
                let direction = ReactionDirection::from_db(&value).ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "invalid direction `{value}` in reaction.direction"
                    ))
                })?;
                Ok(Reaction {
                    user_id,
                    target,
                    direction,
                })
            })
            .transpose()
    }

    fn counts(&self, target: ReactionTarget) -> StoreResult<ReactionCounts> {
        count_for_target(self.conn, target).context("reaction_counts")
    }
}

fn write_reaction(
    conn: &Connection,
    user_id: UserId,
    target: ReactionTarget,
    direction: ReactionDirection,
) -> StoreResult<ReactionCounts> {
    let column = target.column();
    let tx = begin_immediate(conn).context("set_reaction.begin")?;
    if !row_exists(&tx, target.table(), target.id()).context("set_reaction.lookup")? {
        return Err(StoreError::NotFound(target.into()));
    }

    match direction.to_db() {
        None => {
            tx.execute(
                &format!("DELETE FROM reaction WHERE user_id = ?1 AND {column} = ?2;"),
                params![user_id, target.id()],
            )
            .context("set_reaction.withdraw")?;
        }
        Some(value) => {
            let changed = tx
                .execute(
                    &format!(
                        "UPDATE reaction
                         SET direction = ?3,
                             updated_at = CAST(unixepoch('subsec') * 1000 AS INTEGER)
                         WHERE user_id = ?1 AND {column} = ?2;"
                    ),
                    params![user_id, target.id(), value],
                )
                .context("set_reaction.update")?;
            if changed == 0 {
                tx.execute(
                    &format!(
                        "INSERT INTO reaction (user_id, {column}, direction) VALUES (?1, ?2, ?3);"
                    ),
                    params![user_id, target.id(), value],
                )
                .context("set_reaction.insert")?;
            }
        }
    }

    let counts = count_for_target(&tx, target).context("set_reaction.count")?;
    tx.execute(
        &format!(
            "UPDATE {} SET likes = ?2, dislikes = ?3 WHERE id = ?1;",
            target.table()
        ),
        params![target.id(), counts.likes, counts.dislikes],
    )
    .context("set_reaction.counters")?;

    tx.commit().context("set_reaction.commit")?;
    Ok(counts)
}

pub(crate) fn count_for_target(
    conn: &Connection,
    target: ReactionTarget,
) -> rusqlite::Result<ReactionCounts> {
    conn.query_row(
        &format!(
            "SELECT
                COALESCE(SUM(direction = 'like'), 0),
                COALESCE(SUM(direction = 'dislike'), 0)
             FROM reaction
             WHERE {} = ?1;",
            target.column()
        ),
        [target.id()],
        |row| Ok(ReactionCounts::new(row.get(0)?, row.get(1)?)),
    )
}

/// Removes every reaction on one comment. Caller owns the transaction.
pub(crate) fn delete_for_comment(
    conn: &Connection,
    comment_id: CommentId,
) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM reaction WHERE comment_id = ?1;", [comment_id])
}

/// Removes reactions on a post and on all of its comments. Caller owns the
/// transaction.
pub(crate) fn delete_for_post(conn: &Connection, post_id: PostId) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM reaction
         WHERE post_id = ?1
            OR comment_id IN (SELECT id FROM comment WHERE post_id = ?1);",
        [post_id],
    )
}
