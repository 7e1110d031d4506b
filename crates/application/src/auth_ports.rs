use chrono::{DateTime, Utc};
use launchpad_domain::{UserId, UserRole};

mod tokens;
mod users;

pub use tokens::{IssuedToken, RevokedTokenRepository, TokenClaims, TokenIssuer};
pub use users::{PasswordHasher, UserRepository};

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical lower-cased email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Platform-wide account role.
    pub role: UserRole,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Account to persist on signup or seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Canonical lower-cased email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Platform-wide account role.
    pub role: UserRole,
}
