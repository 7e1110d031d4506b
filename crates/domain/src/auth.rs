//! Authentication request and response schemas.

use launchpad_core::validation::reject;
use launchpad_core::{AppResult, Validate};
use serde::{Deserialize, Serialize};

use crate::user::{EmailAddress, UserRole, validate_password};

/// Credentials for an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    /// Account email; matched case-insensitively.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role the caller wants to act as.
    #[serde(default)]
    pub role: UserRole,
}

impl Validate for LoginInput {
    fn validate(&self) -> AppResult<()> {
        EmailAddress::new(&self.email)?;
        if self.password.is_empty() {
            return reject("password", "password is required");
        }
        Ok(())
    }
}

/// Issued bearer token after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    /// Bearer token for subsequent calls.
    pub token: String,
    /// Human-readable outcome.
    pub message: String,
}

/// New account registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    /// Account email; stored lower-cased.
    pub email: String,
    /// Plaintext password checked against strength rules.
    pub password: String,
    /// Requested account role.
    #[serde(default)]
    pub role: UserRole,
}

impl Validate for SignupInput {
    fn validate(&self) -> AppResult<()> {
        EmailAddress::new(&self.email)?;
        validate_password(&self.password)
    }
}

/// Registration result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupOutput {
    /// Role assigned to the account.
    pub role: UserRole,
    /// Bearer token for subsequent calls.
    pub token: String,
    /// Human-readable outcome.
    pub message: String,
}

/// Logout takes its token from the request credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutInput {}

impl Validate for LogoutInput {
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Logout result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutOutput {
    /// Whether the token was revoked.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}
