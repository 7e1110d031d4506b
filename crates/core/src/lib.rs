//! Shared primitives for all Rust crates in Launchpad.

#![forbid(unsafe_code)]

/// Field-level input validation primitives.
pub mod validation;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use validation::{FieldViolation, Validate};

/// Result type used across Launchpad crates.
pub type AppResult<T> = Result<T, AppError>;

/// Organization identifier scoping per-organization roles and memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(Uuid);

impl OrganizationId {
    /// Creates a random organization identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an organization identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses an organization identifier from its textual form.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid organization id: {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrganizationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrganizationId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input failed a schema rule on one specific field.
    #[error("validation error: {0}")]
    InvalidField(FieldViolation),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but its roles lack the required statement.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable machine-readable category for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidField(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns whether this error was raised by input validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidField(_))
    }

    /// Returns whether this error was raised by an authorization check.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    /// Returns the message without the category prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidField(violation) => violation.message.as_str(),
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::Internal(message) => message.as_str(),
        }
    }

    /// Returns the offending field path of a field-level validation error.
    #[must_use]
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::InvalidField(violation) => Some(violation.path.as_str()),
            _ => None,
        }
    }

    /// Rebuilds an error from its wire parts, the inverse of
    /// [`code`](Self::code), [`detail`](Self::detail) and
    /// [`field_path`](Self::field_path). Unknown codes become `Internal`.
    #[must_use]
    pub fn from_code(code: &str, message: String, path: Option<String>) -> Self {
        match (code, path) {
            ("validation", Some(path)) => Self::InvalidField(FieldViolation { path, message }),
            ("validation", None) => Self::Validation(message),
            ("not_found", _) => Self::NotFound(message),
            ("conflict", _) => Self::Conflict(message),
            ("unauthorized", _) => Self::Unauthorized(message),
            ("forbidden", _) => Self::Forbidden(message),
            _ => Self::Internal(message),
        }
    }
}
