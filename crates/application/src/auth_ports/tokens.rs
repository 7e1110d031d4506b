use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launchpad_core::AppResult;
use launchpad_domain::{UserId, UserRole};

use super::UserRecord;

/// Bearer token issued for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token handed to the client.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Verified contents of a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Account the token was issued to.
    pub user_id: UserId,
    /// Account email at issue time.
    pub email: String,
    /// Account role at issue time.
    pub role: UserRole,
    /// Unique token identifier.
    pub token_id: String,
    /// Issue instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Port for signing and verifying bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues a token for an account.
    fn issue(&self, user: &UserRecord) -> AppResult<IssuedToken>;

    /// Verifies signature and expiry. Any failure is `Unauthorized`.
    fn verify(&self, token: &str) -> AppResult<TokenClaims>;
}

/// Repository port for logged-out tokens.
///
/// Tokens are stored as SHA-256 digests and kept until they would have
/// expired anyway.
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    /// Records a revoked token digest. Revoking twice is not an error.
    async fn revoke(&self, token_digest: &str, expires_at: DateTime<Utc>) -> AppResult<()>;

    /// Returns whether the digest has been revoked.
    async fn is_revoked(&self, token_digest: &str) -> AppResult<bool>;

    /// Deletes revocations that expired before `now`. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
