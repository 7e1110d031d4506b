//! PostgreSQL-backed logout revocation list.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use launchpad_application::RevokedTokenRepository;
use launchpad_core::{AppError, AppResult};


/// PostgreSQL implementation of the revoked token repository port.
#[derive(Clone)]
pub struct PostgresRevokedTokenRepository {
    pool: PgPool,
}

impl PostgresRevokedTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevokedTokenRepository for PostgresRevokedTokenRepository {
    async fn revoke(&self, token_digest: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (id, token_digest, expires_at, revoked_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (token_digest) DO NOTHING
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(token_digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke token: {error}")))?;

        Ok(())
    }

    async fn is_revoked(&self, token_digest: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM revoked_tokens WHERE token_digest = $1
            )
            "#,
        )
        .bind(token_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check token revocation: {error}")))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM revoked_tokens
            WHERE expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to purge expired revocations: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}
