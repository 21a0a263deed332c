//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Isolate SQLite query details from service orchestration.
//! - Run every multi-table mutation inside one immediate transaction.
//!
//! # Invariants
//! - Write paths validate text before any SQL mutation.
//! - Zero affected rows on update/delete is reported as `NotFound`.
//! - Cascades are explicit deletes; the schema declares no `ON DELETE CASCADE`.

pub mod comment_repo;
pub mod error;
pub mod notification_repo;
pub mod post_repo;
pub mod reaction_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use error::{StoreError, StoreResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Rejects connections whose schema was not migrated by this binary.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let actual_version = current_user_version(conn).map_err(|err| match err {
        DbError::Sqlite(err) => StoreError::storage("schema_check", err),
        other => StoreError::Storage {
            operation: "schema_check",
            source: other,
        },
    })?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

/// Starts a write transaction that takes the database write lock up front.
///
/// Dropping the returned transaction without `commit` rolls it back.
pub(crate) fn begin_immediate(conn: &Connection) -> rusqlite::Result<Transaction<'_>> {
    Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
}

/// `table` must be a compile-time table name, never caller input.
pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: i64) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
