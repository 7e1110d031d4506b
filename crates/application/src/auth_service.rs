//! Account authentication service.
//!
//! Owns signup, login, logout and bearer-token authentication. Login
//! failures use one generic message for unknown emails and wrong passwords.

use std::sync::Arc;

use launchpad_core::AppResult;

use crate::{PasswordHasher, RevokedTokenRepository, TokenIssuer, UserRepository};

mod authenticate;
mod login;
mod logout;
mod signup;


/// Application service for account sessions.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
    revoked_token_repository: Arc<dyn RevokedTokenRepository>,
}

impl AuthService {
    /// Creates a new auth service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
        revoked_token_repository: Arc<dyn RevokedTokenRepository>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_issuer,
            revoked_token_repository,
        }
    }

    /// Deletes revocation rows for tokens that have expired anyway.
    pub async fn purge_expired_revocations(&self) -> AppResult<u64> {
        self.revoked_token_repository
            .purge_expired(chrono::Utc::now())
            .await
    }
}

/// Computes the SHA-256 digest of a bearer token for storage.
#[must_use]
pub fn token_digest(token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}
