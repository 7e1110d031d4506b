//! User domain types and validation rules.
//!
//! Follows OWASP Authentication and Password Storage cheat sheets for all
//! password strength and email validation rules.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use launchpad_core::validation::reject;
use launchpad_core::{AppError, AppResult, OrganizationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{Role, global_admin, global_user};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a user identifier from a token subject.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|error| AppError::Unauthorized(format!("invalid subject: {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Trims and lower-cases the value, then checks: exactly one `@`, non-empty
    /// local part, dotted domain, at most 254 characters.
    pub fn new(value: impl AsRef<str>) -> AppResult<Self> {
        Self::at_path("email", value)
    }

    /// Creates a validated email address, reporting failures at `path`.
    pub fn at_path(path: &str, value: impl AsRef<str>) -> AppResult<Self> {
        let normalized = value.as_ref().trim().to_lowercase();

        if normalized.is_empty() {
            return reject(path, "email address must not be empty");
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return reject(path, "email address must contain exactly one '@'");
        };

        if domain.contains('@') {
            return reject(path, "email address must contain exactly one '@'");
        }

        if local.is_empty() {
            return reject(path, "email local part must not be empty");
        }

        if domain.is_empty()
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return reject(path, "email domain must contain at least one '.'");
        }

        if normalized.chars().any(char::is_whitespace) {
            return reject(path, "email address must not contain whitespace");
        }

        if normalized.len() > 254 {
            return reject(path, "email address must not exceed 254 characters");
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Minimum password length (NIST SP800-63B).
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length to allow passphrases (OWASP recommendation: at least 64).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password for new credentials.
///
/// - 8 to 128 characters (upper bound protects Argon2id from oversized input).
/// - At least one letter and one digit.
/// - Not on the embedded list of breached passwords.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return reject(
            "password",
            format!("password must be at least {PASSWORD_MIN_LENGTH} characters"),
        );
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return reject(
            "password",
            format!("password must not exceed {PASSWORD_MAX_LENGTH} characters"),
        );
    }

    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit())
    {
        return reject(
            "password",
            "password must contain at least one letter and one digit",
        );
    }

    if is_common_password(password) {
        return reject(
            "password",
            "this password is too common and has appeared in data breaches",
        );
    }

    Ok(())
}

fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|entry| *entry == lowered)
}

/// Top breached passwords that still satisfy the composition rules.
static COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "password12",
    "password123",
    "passw0rd",
    "qwerty123",
    "abc12345",
    "abcd1234",
    "iloveyou1",
    "welcome1",
    "welcome123",
    "letmein1",
    "admin123",
    "admin1234",
    "sunshine1",
    "princess1",
    "football1",
    "baseball1",
    "monkey123",
    "dragon123",
    "trustno1",
    "qwertyuiop1",
    "1q2w3e4r",
    "1qaz2wsx",
    "zaq12wsx",
    "p@ssw0rd",
];

/// Platform-wide account role stored on the user record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular account.
    #[default]
    User,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Returns the global catalogue role granted by this account role.
    pub fn catalogue_role(&self) -> AppResult<&'static Role> {
        match self {
            Self::User => global_user(),
            Self::Admin => global_admin(),
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown user role '{value}'"))),
        }
    }
}

/// Authenticated caller of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Account identifier.
    pub user_id: UserId,
    /// Account email.
    pub email: EmailAddress,
    /// Global account role.
    pub role: UserRole,
    /// Organization the request acts within, if any.
    pub organization_id: Option<OrganizationId>,
}

impl Actor {
    /// Returns the same actor scoped to an organization.
    #[must_use]
    pub fn within(mut self, organization_id: Option<OrganizationId>) -> Self {
        self.organization_id = organization_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use launchpad_core::{AppError, AppResult};

    use super::*;

    #[test]
    fn valid_email_is_normalized() -> AppResult<()> {
        let email = EmailAddress::new("  USER@Example.COM ")?;
        assert_eq!(email.as_str(), "user@example.com");
        Ok(())
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
    }

    #[test]
    fn email_with_two_ats_is_rejected() {
        assert!(EmailAddress::new("a@b@example.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn email_errors_carry_field_path() {
        match EmailAddress::at_path("invitee.email", "") {
            Err(AppError::InvalidField(violation)) => assert_eq!(violation.path, "invitee.email"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn email_deserialization_normalizes() -> Result<(), serde_json::Error> {
        let email: EmailAddress = serde_json::from_str("\"Mixed@Case.Io\"")?;
        assert_eq!(email.as_str(), "mixed@case.io");
        Ok(())
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(validate_password("a1b2").is_err());
    }

    #[test]
    fn password_without_digit_is_rejected() {
        assert!(validate_password("only-letters-here").is_err());
    }

    #[test]
    fn adequate_password_is_accepted() {
        assert!(validate_password("a-reasonable-passphrase-42").is_ok());
    }

    #[test]
    fn common_password_is_rejected() {
        assert!(validate_password("Password123").is_err());
    }

    #[test]
    fn very_long_password_is_rejected() {
        let long = format!("{}1", "a".repeat(PASSWORD_MAX_LENGTH));
        assert!(validate_password(&long).is_err());
    }

    #[test]
    fn user_role_defaults_to_user() -> AppResult<()> {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!("ADMIN".parse::<UserRole>()?, UserRole::Admin);
        assert_eq!(UserRole::Admin.catalogue_role()?.name(), "admin");
        Ok(())
    }
}
