use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// One rejected input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `fieldValues.1`.
    pub path: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for one field path.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps this violation into an application error.
    #[must_use]
    pub fn into_error(self) -> AppError {
        AppError::InvalidField(self)
    }
}

impl Display for FieldViolation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}: {}", self.path, self.message)
    }
}

/// Schema rules for an input payload.
///
/// Implementations reject the first violated rule with
/// [`AppError::InvalidField`]. Validation is synchronous and side-effect free.
pub trait Validate {
    /// Checks the payload against its schema rules.
    fn validate(&self) -> AppResult<()>;
}

/// Shorthand for rejecting one field.
pub fn reject<T>(path: impl Into<String>, message: impl Into<String>) -> AppResult<T> {
    Err(FieldViolation::new(path, message).into_error())
}
