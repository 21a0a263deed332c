//! Store error taxonomy shared by every repository.

use crate::db::DbError;
use crate::model::comment::CommentId;
use crate::model::notification::NotificationId;
use crate::model::post::PostId;
use crate::model::reaction::ReactionTarget;
use crate::model::validation::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity named by a `NotFound` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Post(PostId),
    Comment(CommentId),
    Notification(NotificationId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post(id) => write!(f, "post {id}"),
            Self::Comment(id) => write!(f, "comment {id}"),
            Self::Notification(id) => write!(f, "notification {id}"),
        }
    }
}

impl From<ReactionTarget> for EntityRef {
    fn from(value: ReactionTarget) -> Self {
        match value {
            ReactionTarget::Post(id) => Self::Post(id),
            ReactionTarget::Comment(id) => Self::Comment(id),
        }
    }
}

/// Error returned by every store operation.
///
/// A failed mutating operation never leaves a partially applied change.
#[derive(Debug)]
pub enum StoreError {
    /// Input rejected before storage was touched.
    Validation(ValidationError),
    /// Referenced entity does not exist, or the write affected zero rows.
    NotFound(EntityRef),
    /// The database stayed locked past the busy timeout. Safe to retry.
    Conflict {
        operation: &'static str,
        source: DbError,
    },
    /// Any other backing-store failure; the enclosing transaction was rolled back.
    Storage {
        operation: &'static str,
        source: DbError,
    },
    /// A persisted row holds a value the model cannot represent.
    InvalidData(String),
    /// Repository was built over a connection without the current schema.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl StoreError {
    /// Wraps a raw SQLite failure with the step that produced it.
    pub fn storage(operation: &'static str, err: rusqlite::Error) -> Self {
        let source = DbError::Sqlite(err);
        match source.sqlite_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Conflict { operation, source }
            }
            _ => Self::Storage { operation, source },
        }
    }

    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Storage { .. } => "storage_fault",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict { operation, source } => {
                write!(f, "{operation}: concurrent modification: {source}")
            }
            Self::Storage { operation, source } => write!(f, "{operation}: {source}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Conflict { source, .. } | Self::Storage { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidData(_) | Self::UninitializedConnection { .. } => {
                None
            }
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Attaches an operation step name to raw SQLite results.
pub(crate) trait StorageContext<T> {
    fn context(self, operation: &'static str) -> StoreResult<T>;
}

impl<T> StorageContext<T> for rusqlite::Result<T> {
    fn context(self, operation: &'static str) -> StoreResult<T> {
        self.map_err(|err| StoreError::storage(operation, err))
    }
}
