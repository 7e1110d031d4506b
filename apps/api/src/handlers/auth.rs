use launchpad_core::AppResult;
use launchpad_domain::{
    LoginInput, LoginOutput, LogoutInput, LogoutOutput, SignupInput, SignupOutput,
};

use crate::middleware::RequestContext;
use crate::state::AppState;

pub async fn login(
    state: AppState,
    _context: RequestContext,
    input: LoginInput,
) -> AppResult<LoginOutput> {
    state.auth_service.login(input).await
}

pub async fn signup(
    state: AppState,
    _context: RequestContext,
    input: SignupInput,
) -> AppResult<SignupOutput> {
    state.auth_service.signup(input).await
}

pub async fn logout(
    state: AppState,
    context: RequestContext,
    _input: LogoutInput,
) -> AppResult<LogoutOutput> {
    state.auth_service.logout(context.bearer_token()?).await
}
