use launchpad_core::AppResult;
use tracing::info;

use crate::api_config::AdminSeedConfig;
use crate::state::AppState;

/// Makes sure the configured platform administrator exists.
///
/// Admin accounts cannot sign up through `auth.signup`, so this is the only
/// way to create one. Re-running with the same email is a no-op.
pub async fn run(state: &AppState, seed: &AdminSeedConfig) -> AppResult<()> {
    let admin = state
        .auth_service
        .ensure_admin(&seed.email, &seed.password)
        .await?;

    info!(user_id = %admin.id, email = %admin.email, "admin account ready");
    Ok(())
}
