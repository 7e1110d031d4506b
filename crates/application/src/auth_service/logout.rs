use launchpad_core::AppResult;
use launchpad_domain::LogoutOutput;

use super::{AuthService, token_digest};

impl AuthService {
    /// Revokes a bearer token until its natural expiry.
    pub async fn logout(&self, token: &str) -> AppResult<LogoutOutput> {
        let claims = self.token_issuer.verify(token)?;

        self.revoked_token_repository
            .revoke(&token_digest(token), claims.expires_at)
            .await?;

        Ok(LogoutOutput {
            success: true,
            message: "signed out".to_owned(),
        })
    }
}
