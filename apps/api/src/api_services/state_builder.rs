use std::sync::Arc;

use launchpad_application::{
    AuthService, AuthorizationService, OrganizationService, WaitlistService,
};
use launchpad_core::AppError;
use launchpad_infrastructure::{
    Argon2PasswordHasher, BroadcastWaitlistEventPublisher, InMemoryEntrySearchCache,
    JwtTokenIssuer,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub use repositories::RepositorySet;

pub fn build_app_state(repositories: RepositorySet, config: &ApiConfig) -> Result<AppState, AppError> {
    let token_issuer = Arc::new(JwtTokenIssuer::new(
        &config.jwt_secret,
        config.token_ttl_seconds,
    )?);
    let authorization_service =
        AuthorizationService::new(repositories.organization_repository.clone());

    let auth_service = AuthService::new(
        repositories.user_repository.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        token_issuer,
        repositories.revoked_token_repository,
    );
    let organization_service = OrganizationService::new(
        repositories.organization_repository,
        repositories.user_repository,
        authorization_service.clone(),
    );
    let waitlist_service = WaitlistService::new(
        repositories.waitlist_repository,
        authorization_service,
        Arc::new(InMemoryEntrySearchCache::new(config.search_cache_ttl)),
        Arc::new(BroadcastWaitlistEventPublisher::new(
            config.event_buffer_capacity,
        )),
    );

    Ok(AppState {
        auth_service,
        organization_service,
        waitlist_service,
    })
}
