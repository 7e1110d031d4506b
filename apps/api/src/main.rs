//! Launchpad API composition root.

#![forbid(unsafe_code)]

mod admin_seed;
mod api_config;
mod api_router;
mod api_services;
mod error;
mod handlers;
mod middleware;
mod rpc;
mod state;

use launchpad_application::AuthService;
use launchpad_contract::app_contract;
use launchpad_core::AppError;
use tracing::{info, warn};

use crate::api_config::ApiConfig;
use crate::api_services::{RepositorySet, build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let repositories = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_and_migrate(database_url).await?;
            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }
            RepositorySet::postgres(&pool)
        }
        None => {
            warn!("DATABASE_URL is not set; using in-memory storage");
            RepositorySet::in_memory()
        }
    };

    let app_state = build_app_state(repositories, &config)?;
    if let Some(seed) = &config.admin_seed {
        admin_seed::run(&app_state, seed).await?;
    }

    spawn_revocation_purge(
        app_state.auth_service.clone(),
        config.revocation_purge_interval,
    );

    let app = api_router::build_router(app_state, app_contract()?, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "launchpad-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn spawn_revocation_purge(auth_service: AuthService, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match auth_service.purge_expired_revocations().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "purged expired token revocations"),
                Err(error) => warn!(%error, "failed to purge token revocations"),
            }
        }
    });
}
