use std::sync::Arc;

use launchpad_application::{
    OrganizationRepository, RevokedTokenRepository, UserRepository, WaitlistRepository,
};
use launchpad_infrastructure::{
    InMemoryOrganizationRepository, InMemoryRevokedTokenRepository, InMemoryUserRepository,
    InMemoryWaitlistRepository, PostgresOrganizationRepository, PostgresRevokedTokenRepository,
    PostgresUserRepository, PostgresWaitlistRepository,
};
use sqlx::PgPool;

/// Storage adapters behind the application services.
pub struct RepositorySet {
    pub(super) user_repository: Arc<dyn UserRepository>,
    pub(super) revoked_token_repository: Arc<dyn RevokedTokenRepository>,
    pub(super) organization_repository: Arc<dyn OrganizationRepository>,
    pub(super) waitlist_repository: Arc<dyn WaitlistRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            revoked_token_repository: Arc::new(PostgresRevokedTokenRepository::new(pool.clone())),
            organization_repository: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
            waitlist_repository: Arc::new(PostgresWaitlistRepository::new(pool.clone())),
        }
    }

    /// Process-local storage, lost on restart.
    pub fn in_memory() -> Self {
        Self {
            user_repository: Arc::new(InMemoryUserRepository::new()),
            revoked_token_repository: Arc::new(InMemoryRevokedTokenRepository::new()),
            organization_repository: Arc::new(InMemoryOrganizationRepository::new()),
            waitlist_repository: Arc::new(InMemoryWaitlistRepository::new()),
        }
    }
}
