use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use launchpad_application::{NewUserRecord, RevokedTokenRepository, UserRecord, UserRepository};
use launchpad_core::{AppError, AppResult};
use launchpad_domain::UserId;
use tokio::sync::RwLock;

/// In-memory user repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let email = user.email.to_lowercase();
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == email) {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let record = UserRecord {
            id: UserId::new(),
            email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }
}

/// In-memory logout revocation list.
#[derive(Debug, Default)]
pub struct InMemoryRevokedTokenRepository {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRevokedTokenRepository {
    /// Creates an empty revocation list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryRevokedTokenRepository {
    async fn revoke(&self, token_digest: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        self.revoked
            .write()
            .await
            .entry(token_digest.to_owned())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_digest: &str) -> AppResult<bool> {
        Ok(self.revoked.read().await.contains_key(token_digest))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at >= now);
        Ok(u64::try_from(before - revoked.len()).unwrap_or(u64::MAX))
    }
}
