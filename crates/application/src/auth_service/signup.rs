use launchpad_core::{AppError, AppResult, Validate};
use launchpad_domain::{EmailAddress, SignupInput, SignupOutput, UserRole, validate_password};

use crate::{NewUserRecord, UserRecord};

use super::AuthService;

impl AuthService {
    /// Registers a regular account and issues its first token.
    ///
    /// Administrator accounts cannot be self-registered; they are seeded by
    /// the operator through [`AuthService::ensure_admin`].
    pub async fn signup(&self, input: SignupInput) -> AppResult<SignupOutput> {
        input.validate()?;

        if input.role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "administrator accounts cannot be self-registered".to_owned(),
            ));
        }

        let email = EmailAddress::new(&input.email)?;
        if self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            // Keep the response time close to a successful signup.
            let _ = self.password_hasher.hash_password(&input.password);
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let user = self
            .create_user(email, &input.password, UserRole::User)
            .await?;
        let issued = self.token_issuer.issue(&user)?;

        Ok(SignupOutput {
            role: user.role,
            token: issued.token,
            message: "account created".to_owned(),
        })
    }

    /// Ensures an administrator account exists for the given credentials.
    ///
    /// An existing administrator is returned unchanged; an existing regular
    /// account with the same email is a `Conflict`.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<UserRecord> {
        let email = EmailAddress::at_path("adminEmail", email)?;
        validate_password(password)?;

        match self.user_repository.find_by_email(email.as_str()).await? {
            Some(user) if user.role == UserRole::Admin => Ok(user),
            Some(_) => Err(AppError::Conflict(format!(
                "account '{email}' exists without the administrator role"
            ))),
            None => self.create_user(email, password, UserRole::Admin).await,
        }
    }

    async fn create_user(
        &self,
        email: EmailAddress,
        password: &str,
        role: UserRole,
    ) -> AppResult<UserRecord> {
        let password_hash = self.password_hasher.hash_password(password)?;
        self.user_repository
            .create(NewUserRecord {
                email: email.into(),
                password_hash,
                role,
            })
            .await
    }
}
