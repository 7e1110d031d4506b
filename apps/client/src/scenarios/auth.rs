use launchpad_contract::routes::auth;
use launchpad_core::AppResult;
use launchpad_domain::{LoginInput, LogoutInput, SignupInput, UserRole};
use tracing::info;

use super::ScenarioContext;
use super::steps::{
    SCENARIO_PASSWORD, expect_unauthorized, expect_validation, passed, signup_user, unique_email,
};

/// Signup, login, logout, then reuse of the revoked token.
pub(super) async fn run(context: &ScenarioContext) -> AppResult<()> {
    let (email, _) = signup_user(context, "auth").await?;
    passed("signup");

    let login = context
        .client
        .mutate::<auth::Login>(&LoginInput {
            email: email.clone(),
            password: SCENARIO_PASSWORD.to_owned(),
            role: UserRole::User,
        })
        .await?;
    info!(message = %login.message, "login answered");
    passed("login");

    let wrong_password = context
        .client
        .mutate::<auth::Login>(&LoginInput {
            email: email.clone(),
            password: "not-the-password-1".to_owned(),
            role: UserRole::User,
        })
        .await;
    expect_unauthorized("login with wrong password", wrong_password)?;

    let session = context.client.with_token(login.token);
    let logout = session.mutate::<auth::Logout>(&LogoutInput {}).await?;
    info!(message = %logout.message, "logout answered");
    passed("logout");

    let reused = session.mutate::<auth::Logout>(&LogoutInput {}).await;
    expect_unauthorized("revoked token reuse", reused)?;

    let weak = context
        .client
        .mutate::<auth::Signup>(&SignupInput {
            email: unique_email("weak"),
            password: "short".to_owned(),
            role: UserRole::User,
        })
        .await;
    expect_validation("signup with weak password", weak)
}
