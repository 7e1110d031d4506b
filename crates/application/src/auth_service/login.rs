use launchpad_core::{AppError, AppResult, Validate};
use launchpad_domain::{EmailAddress, LoginInput, LoginOutput, UserRole};

use super::AuthService;

const INVALID_CREDENTIALS: &str = "invalid email or password";

impl AuthService {
    /// Authenticates with email and password and issues a token.
    ///
    /// Unknown emails and wrong passwords share one `Unauthorized` message.
    /// Requesting `ADMIN` for an account without that role is `Forbidden`.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginOutput> {
        input.validate()?;

        let email = EmailAddress::new(&input.email)?;
        let Some(user) = self.user_repository.find_by_email(email.as_str()).await? else {
            // Always hash to prevent timing attacks even when the user is unknown.
            let _ = self.password_hasher.hash_password(&input.password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(&input.password, &user.password_hash)?
        {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        if input.role == UserRole::Admin && user.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "account does not hold the ADMIN role".to_owned(),
            ));
        }

        let issued = self.token_issuer.issue(&user)?;
        Ok(LoginOutput {
            token: issued.token,
            message: format!("signed in as {}", user.role.as_str()),
        })
    }
}
