use axum::extract::Request;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::Actor;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header selecting the organization a call acts within.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";

/// Caller credentials read from request headers.
///
/// Tokens are only verified when a resolver asks for the actor, so public
/// procedures work without one.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    bearer_token: Option<String>,
    organization_id: Option<OrganizationId>,
}

impl RequestContext {
    fn from_headers(headers: &HeaderMap) -> AppResult<Self> {
        let bearer_token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);

        let organization_id = headers
            .get(ORGANIZATION_HEADER)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|error| {
                        AppError::Validation(format!("invalid {ORGANIZATION_HEADER} header: {error}"))
                    })
                    .and_then(OrganizationId::parse)
            })
            .transpose()?;

        Ok(Self {
            bearer_token,
            organization_id,
        })
    }

    /// Returns the raw bearer token or `Unauthorized`.
    pub fn bearer_token(&self) -> AppResult<&str> {
        self.bearer_token
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
    }

    /// Resolves the authenticated caller within the selected organization.
    pub async fn actor(&self, state: &AppState) -> AppResult<Actor> {
        state
            .auth_service
            .authenticate(self.bearer_token()?, self.organization_id)
            .await
    }
}

pub async fn request_context(mut request: Request, next: Next) -> ApiResult<Response> {
    let context = RequestContext::from_headers(request.headers())?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
