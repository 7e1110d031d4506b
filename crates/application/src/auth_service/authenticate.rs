use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{Actor, EmailAddress};

use super::{AuthService, token_digest};

impl AuthService {
    /// Resolves the actor behind a bearer token.
    ///
    /// Rejects invalid, expired and revoked tokens as well as tokens of
    /// deleted accounts. The role comes from the stored account, not the
    /// token, so role changes apply to tokens already issued.
    pub async fn authenticate(
        &self,
        token: &str,
        organization_id: Option<OrganizationId>,
    ) -> AppResult<Actor> {
        let claims = self.token_issuer.verify(token)?;

        if self
            .revoked_token_repository
            .is_revoked(&token_digest(token))
            .await?
        {
            return Err(AppError::Unauthorized("token has been revoked".to_owned()));
        }

        let user = self
            .user_repository
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

        Ok(Actor {
            user_id: user.id,
            email: EmailAddress::new(&user.email)?,
            role: user.role,
            organization_id,
        })
    }
}
