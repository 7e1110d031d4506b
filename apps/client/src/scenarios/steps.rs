use launchpad_contract::routes::auth;
use launchpad_core::{AppError, AppResult};
use launchpad_domain::{LoginInput, SignupInput, UserRole};
use tracing::info;
use uuid::Uuid;

use super::ScenarioContext;
use crate::rpc_client::RpcClient;

/// Password used for every account the scenarios register.
pub(super) const SCENARIO_PASSWORD: &str = "launch-pad-2024";

/// Returns an address no earlier run has registered.
pub(super) fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

/// Returns a short random suffix for slugs and names.
pub(super) fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

pub(super) fn passed(step: &str) {
    info!(step, "step passed");
}

/// Registers a fresh `USER` account and returns a client signed in as it.
pub(super) async fn signup_user(
    context: &ScenarioContext,
    prefix: &str,
) -> AppResult<(String, RpcClient)> {
    let email = unique_email(prefix);
    let output = context
        .client
        .mutate::<auth::Signup>(&SignupInput {
            email: email.clone(),
            password: SCENARIO_PASSWORD.to_owned(),
            role: UserRole::User,
        })
        .await?;

    info!(%email, role = output.role.as_str(), "account registered");
    Ok((email, context.client.with_token(output.token)))
}

/// Signs in with the configured admin credentials.
pub(super) async fn login_admin(context: &ScenarioContext) -> AppResult<RpcClient> {
    let (email, password) = context.config.admin_credentials()?;
    let output = context
        .client
        .mutate::<auth::Login>(&LoginInput {
            email: email.to_owned(),
            password: password.to_owned(),
            role: UserRole::Admin,
        })
        .await?;

    passed("admin login");
    Ok(context.client.with_token(output.token))
}

/// Passes only when `result` is a permission denial.
pub(super) fn expect_forbidden<T>(step: &str, result: AppResult<T>) -> AppResult<()> {
    expect_rejection(step, result, AppError::is_forbidden, "forbidden")
}

/// Passes only when `result` is an input validation failure.
pub(super) fn expect_validation<T>(step: &str, result: AppResult<T>) -> AppResult<()> {
    expect_rejection(step, result, AppError::is_validation, "validation")
}

/// Passes only when `result` is an authentication failure.
pub(super) fn expect_unauthorized<T>(step: &str, result: AppResult<T>) -> AppResult<()> {
    expect_rejection(
        step,
        result,
        |error| matches!(error, AppError::Unauthorized(_)),
        "unauthorized",
    )
}

fn expect_rejection<T>(
    step: &str,
    result: AppResult<T>,
    is_expected: impl Fn(&AppError) -> bool,
    expected: &str,
) -> AppResult<()> {
    match result {
        Ok(_) => Err(AppError::Internal(format!(
            "step '{step}' succeeded but a {expected} error was expected"
        ))),
        Err(error) if is_expected(&error) => {
            info!(step, error = %error, "step rejected as expected");
            Ok(())
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_denial_passes() {
        let result: AppResult<()> = Err(AppError::Forbidden("missing permission".to_owned()));
        assert!(expect_forbidden("denied", result).is_ok());
    }

    #[test]
    fn validation_error_in_place_of_denial_fails() {
        let result: AppResult<()> = Err(AppError::Validation("bad input".to_owned()));
        assert!(matches!(
            expect_forbidden("denied", result),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unexpected_success_fails() {
        assert!(matches!(
            expect_validation("rejected", Ok(())),
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            expect_unauthorized("revoked", Ok(1)),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn unique_emails_differ() {
        assert_ne!(unique_email("a"), unique_email("a"));
        assert_eq!(unique_suffix().len(), 8);
    }
}
