//! Text validation rules applied before any mutation reaches storage.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Business-rule violation detected before storage is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The named field is empty after trimming whitespace.
    EmptyText { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText { field } => write!(f, "{field} must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
///
/// Returns the trimmed text that callers should persist.
pub fn validate_text(value: &str) -> Result<String, ValidationError> {
    validate_field("text", value)
}

/// Same rule as [`validate_text`], reporting `field` on failure.
pub fn validate_field(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText { field });
    }
    Ok(trimmed.to_string())
}
