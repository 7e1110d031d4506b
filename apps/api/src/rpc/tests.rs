use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use launchpad_contract::routes::auth::{Login, Signup};
use launchpad_contract::{RouteTree, app_contract};
use launchpad_core::AppError;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::RpcServer;
use crate::api_config::ApiConfig;
use crate::api_router::build_router;
use crate::api_services::{RepositorySet, build_app_state};
use crate::handlers;
use crate::middleware::ORGANIZATION_HEADER;
use crate::state::AppState;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

const PASSWORD: &str = "launch-pad-2024";
const FRONTEND_URL: &str = "http://localhost:3000";

fn test_config() -> ApiConfig {
    ApiConfig {
        migrate_only: false,
        database_url: None,
        jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_owned(),
        token_ttl_seconds: 3600,
        frontend_url: FRONTEND_URL.to_owned(),
        api_host: "127.0.0.1".to_owned(),
        api_port: 0,
        search_cache_ttl: Duration::from_secs(30),
        event_buffer_capacity: 16,
        revocation_purge_interval: Duration::from_secs(300),
        admin_seed: None,
    }
}

fn test_app() -> TestResult<(AppState, Router)> {
    let state = build_app_state(RepositorySet::in_memory(), &test_config())?;
    let router = build_router(state.clone(), app_contract()?, FRONTEND_URL)?;
    Ok((state, router))
}

async fn send(router: &Router, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

async fn call(
    router: &Router,
    path: &str,
    token: Option<&str>,
    input: Value,
) -> TestResult<(StatusCode, Value)> {
    call_within(router, path, token, None, input).await
}

async fn call_within(
    router: &Router,
    path: &str,
    token: Option<&str>,
    organization_id: Option<&str>,
    input: Value,
) -> TestResult<(StatusCode, Value)> {
    let mut request = Request::builder()
        .method(Method::POST)
        .uri(format!("/rpc/{path}"))
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(organization_id) = organization_id {
        request = request.header(ORGANIZATION_HEADER, organization_id);
    }
    send(router, request.body(Body::from(input.to_string()))?).await
}

async fn signup(router: &Router, email: &str) -> TestResult<String> {
    let (status, body) = call(
        router,
        "auth.signup",
        None,
        json!({ "email": email, "password": PASSWORD }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(body["token"].as_str().unwrap_or_default().to_owned())
}

async fn admin_token(state: &AppState, router: &Router) -> TestResult<String> {
    state
        .auth_service
        .ensure_admin("admin@example.com", PASSWORD)
        .await?;
    let (status, body) = call(
        router,
        "auth.login",
        None,
        json!({ "email": "admin@example.com", "password": PASSWORD, "role": "ADMIN" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(body["token"].as_str().unwrap_or_default().to_owned())
}

fn definition_input() -> Value {
    json!({
        "name": "Private beta",
        "description": "Early builds for design partners.",
        "waitlistType": "BETA",
    })
}

#[test]
fn router_requires_every_procedure_bound() -> TestResult {
    let server = RpcServer::new(app_contract()?).mutation::<Login, _, _>(handlers::auth::login)?;
    assert!(server.unbound_paths().contains(&"auth.signup".to_owned()));

    match server.into_router() {
        Err(AppError::Internal(message)) => assert!(message.contains("auth.signup")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("router built with unbound procedures"),
    }
    Ok(())
}

#[test]
fn full_binding_leaves_nothing_unbound() -> TestResult {
    let server = handlers::bind_procedures(RpcServer::new(app_contract()?))?;
    assert!(server.unbound_paths().is_empty());
    assert!(server.into_router().is_ok());
    Ok(())
}

#[test]
fn binding_checks_kind_membership_and_duplicates() -> TestResult {
    let wrong_kind = RpcServer::new(app_contract()?).query::<Login, _, _>(handlers::auth::login);
    assert!(matches!(wrong_kind, Err(AppError::Internal(_))));

    let twice = RpcServer::new(app_contract()?)
        .mutation::<Login, _, _>(handlers::auth::login)?
        .mutation::<Login, _, _>(handlers::auth::login);
    assert!(matches!(twice, Err(AppError::Conflict(_))));

    let partial_tree = RouteTree::new().with::<Login>()?;
    let outside = RpcServer::new(partial_tree).mutation::<Signup, _, _>(handlers::auth::signup);
    assert!(matches!(outside, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> TestResult {
    let (_, router) = test_app()?;
    let request = Request::builder().uri("/health").body(Body::empty())?;
    let (status, body) = send(&router, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn signed_up_caller_reaches_protected_procedures() -> TestResult {
    let (_, router) = test_app()?;
    let token = signup(&router, "Founder@Example.com").await?;

    let (status, organization) = call(
        &router,
        "organization.create",
        Some(&token),
        json!({ "name": "Acme", "slug": "acme" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{organization}");
    assert_eq!(organization["slug"], "acme");

    let (status, membership) = call(
        &router,
        "organization.getMembership",
        Some(&token),
        json!({ "organizationId": organization["id"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{membership}");
    assert_eq!(membership["email"], "founder@example.com");
    assert_eq!(membership["role"], "OWNER");
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> TestResult {
    let (_, router) = test_app()?;
    let (status, body) = call(
        &router,
        "organization.create",
        None,
        json!({ "name": "Acme", "slug": "acme" }),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    Ok(())
}

#[tokio::test]
async fn invalid_input_reports_the_field_path() -> TestResult {
    let (_, router) = test_app()?;
    let (status, body) = call(
        &router,
        "auth.signup",
        None,
        json!({ "email": "short@example.com", "password": "short" }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert_eq!(body["path"], "password");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() -> TestResult {
    let (_, router) = test_app()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rpc/auth.login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = send(&router, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    Ok(())
}

#[tokio::test]
async fn unknown_procedure_is_not_routed() -> TestResult {
    let (_, router) = test_app()?;
    let (status, _) = call(&router, "waitlist.entry.delete", None, json!({})).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_organization_header_is_rejected() -> TestResult {
    let (_, router) = test_app()?;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rpc/auth.logout")
        .header(ORGANIZATION_HEADER, "not-a-uuid")
        .body(Body::empty())?;
    let (status, body) = send(&router, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    Ok(())
}

#[tokio::test]
async fn user_cannot_create_definitions_but_admin_can() -> TestResult {
    let (state, router) = test_app()?;
    let user_token = signup(&router, "user@example.com").await?;

    let (status, body) = call(
        &router,
        "waitlist.definition.create",
        Some(&user_token),
        definition_input(),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let admin = admin_token(&state, &router).await?;
    let (status, definition) = call(
        &router,
        "waitlist.definition.create",
        Some(&admin),
        definition_input(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{definition}");
    assert_eq!(definition["status"], "ACTIVE");

    let (status, entry) = call(
        &router,
        "waitlist.entry.create",
        Some(&user_token),
        json!({ "definitionId": definition["id"], "email": "user@example.com" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{entry}");
    assert_eq!(entry["status"], "PENDING");

    let (status, stats) = call(
        &router,
        "waitlist.definition.getStats",
        Some(&admin),
        json!({ "definitionId": definition["id"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{stats}");
    assert_eq!(stats["pending"], 1);
    Ok(())
}

#[tokio::test]
async fn own_organization_grants_nothing_on_global_waitlists() -> TestResult {
    let (state, router) = test_app()?;
    let admin = admin_token(&state, &router).await?;
    let (_, definition) = call(
        &router,
        "waitlist.definition.create",
        Some(&admin),
        definition_input(),
    )
    .await?;
    let joiner = signup(&router, "joiner@example.com").await?;
    let (_, entry) = call(
        &router,
        "waitlist.entry.create",
        Some(&joiner),
        json!({ "definitionId": definition["id"], "email": "joiner@example.com" }),
    )
    .await?;

    let founder = signup(&router, "founder@example.com").await?;
    let (status, organization) = call(
        &router,
        "organization.create",
        Some(&founder),
        json!({ "name": "Side project", "slug": "side-project" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{organization}");
    let organization_id = organization["id"].as_str().unwrap_or_default().to_owned();

    let (status, body) = call_within(
        &router,
        "waitlist.entry.updateStatus",
        Some(&founder),
        Some(&organization_id),
        json!({ "entryId": entry["id"], "status": "APPROVED" }),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["code"], "forbidden");

    let (status, owned) = call_within(
        &router,
        "waitlist.definition.create",
        Some(&founder),
        Some(&organization_id),
        definition_input(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{owned}");
    assert_eq!(owned["organizationId"], organization["id"]);
    Ok(())
}

#[tokio::test]
async fn logged_out_token_is_rejected() -> TestResult {
    let (_, router) = test_app()?;
    let token = signup(&router, "leaving@example.com").await?;

    let (status, body) = call(&router, "auth.logout", Some(&token), json!({})).await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = call(
        &router,
        "organization.create",
        Some(&token),
        json!({ "name": "Late", "slug": "late" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    Ok(())
}

#[tokio::test]
async fn subscription_opens_an_event_stream() -> TestResult {
    let (state, router) = test_app()?;

    let anonymous = Request::builder()
        .uri("/rpc/waitlist.entry.onStatusChanged")
        .body(Body::empty())?;
    let (status, _) = send(&router, anonymous).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = admin_token(&state, &router).await?;
    let request = Request::builder()
        .uri("/rpc/waitlist.entry.onStatusChanged?input=%7B%7D")
        .header(AUTHORIZATION, format!("Bearer {admin}"))
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/event-stream"));
    Ok(())
}
