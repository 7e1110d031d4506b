use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;
use launchpad_contract::RouteTree;
use launchpad_core::AppError;
use tower_http::trace::TraceLayer;

use crate::rpc::RpcServer;
use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

/// Serves `/health` plus one `/rpc/<path>` route per procedure of `tree`.
pub fn build_router(
    app_state: AppState,
    tree: RouteTree,
    frontend_url: &str,
) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;
    let rpc_routes = handlers::bind_procedures(RpcServer::new(tree))?.into_router()?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(rpc_routes)
        .layer(from_fn(middleware::request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
