//! Typed RPC binding over the shared route tree.
//!
//! [`RpcServer`] maps the route tree to one binding slot per procedure.
//! Resolvers are bound with the procedure's own input and output types;
//! building the router fails while any slot is still empty, so a served
//! tree can never miss a procedure the client knows about.
//!
//! Transport: `POST /rpc/<path>` with a JSON body for queries and
//! mutations, `GET /rpc/<path>?input=<json>` answering with server-sent
//! events for subscriptions. Inputs are validated before the resolver runs.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Extension, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};
use launchpad_contract::{OperationKind, Procedure, RouteTree, Shape};
use launchpad_core::{AppError, AppResult, Validate};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::middleware::RequestContext;
use crate::state::AppState;

#[cfg(test)]
mod tests;

/// Keep-alive comment interval on open subscription streams.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

type UnaryHandler = Arc<
    dyn Fn(AppState, RequestContext, Value) -> BoxFuture<'static, AppResult<Value>> + Send + Sync,
>;
type ValueStream = BoxStream<'static, AppResult<Value>>;
type StreamHandler = Arc<
    dyn Fn(AppState, RequestContext, Value) -> BoxFuture<'static, AppResult<ValueStream>>
        + Send
        + Sync,
>;

#[derive(Clone)]
enum Binding {
    Unary(UnaryHandler),
    Stream(StreamHandler),
}

/// Server half of the route contract.
pub struct RpcServer {
    tree: RouteTree,
    bindings: Shape<Option<Binding>>,
}

impl RpcServer {
    /// Creates a server with one empty slot per procedure in the tree.
    #[must_use]
    pub fn new(tree: RouteTree) -> Self {
        let bindings = tree.map(|_| None);
        Self { tree, bindings }
    }

    /// Binds the resolver of a query procedure.
    pub fn query<P, F, Fut>(self, resolver: F) -> AppResult<Self>
    where
        P: Procedure,
        F: Fn(AppState, RequestContext, P::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<P::Output>> + Send + 'static,
    {
        self.bind_unary::<P, F, Fut>(OperationKind::Query, resolver)
    }

    /// Binds the resolver of a mutation procedure.
    pub fn mutation<P, F, Fut>(self, resolver: F) -> AppResult<Self>
    where
        P: Procedure,
        F: Fn(AppState, RequestContext, P::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<P::Output>> + Send + 'static,
    {
        self.bind_unary::<P, F, Fut>(OperationKind::Mutation, resolver)
    }

    /// Binds the resolver of a subscription procedure.
    ///
    /// The resolver opens the stream; the stream lives until the client
    /// disconnects.
    pub fn subscription<P, F, Fut, S>(self, resolver: F) -> AppResult<Self>
    where
        P: Procedure,
        F: Fn(AppState, RequestContext, P::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<S>> + Send + 'static,
        S: Stream<Item = P::Output> + Send + 'static,
    {
        let resolver = Arc::new(resolver);
        let handler: StreamHandler = Arc::new(move |state, context, value| {
            let resolver = Arc::clone(&resolver);
            async move {
                let input = decode_input::<P>(value)?;
                let stream = resolver(state, context, input).await?;
                Ok(stream.map(|output| encode_output::<P>(&output)).boxed())
            }
            .boxed()
        });

        self.bind::<P>(OperationKind::Subscription, Binding::Stream(handler))
    }

    fn bind_unary<P, F, Fut>(self, kind: OperationKind, resolver: F) -> AppResult<Self>
    where
        P: Procedure,
        F: Fn(AppState, RequestContext, P::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<P::Output>> + Send + 'static,
    {
        let resolver = Arc::new(resolver);
        let handler: UnaryHandler = Arc::new(move |state, context, value| {
            let resolver = Arc::clone(&resolver);
            async move {
                let input = decode_input::<P>(value)?;
                let output = resolver(state, context, input).await?;
                encode_output::<P>(&output)
            }
            .boxed()
        });

        self.bind::<P>(kind, Binding::Unary(handler))
    }

    fn bind<P: Procedure>(mut self, kind: OperationKind, binding: Binding) -> AppResult<Self> {
        if P::KIND != kind {
            return Err(AppError::Internal(format!(
                "procedure '{}' is a {} and cannot be bound as a {kind}",
                P::PATH,
                P::KIND
            )));
        }

        if self.tree.operation(P::PATH) != Some(&P::descriptor()) {
            return Err(AppError::NotFound(format!(
                "procedure '{}' is not part of the route tree",
                P::PATH
            )));
        }

        let slot = self.bindings.get_mut(P::PATH).ok_or_else(|| {
            AppError::NotFound(format!("procedure '{}' has no binding slot", P::PATH))
        })?;
        if slot.is_some() {
            return Err(AppError::Conflict(format!(
                "procedure '{}' is already bound",
                P::PATH
            )));
        }

        *slot = Some(binding);
        Ok(self)
    }

    /// Returns the paths still waiting for a resolver.
    #[must_use]
    pub fn unbound_paths(&self) -> Vec<String> {
        self.bindings
            .entries()
            .into_iter()
            .filter(|(_, binding)| binding.is_none())
            .map(|(path, _)| path)
            .collect()
    }

    /// Builds the axum router serving every bound procedure.
    ///
    /// Fails while any procedure of the tree is unbound.
    pub fn into_router(self) -> AppResult<Router<AppState>> {
        let unbound = self.unbound_paths();
        if !unbound.is_empty() {
            return Err(AppError::Internal(format!(
                "unbound procedures: {}",
                unbound.join(", ")
            )));
        }

        let mut router = Router::new();
        for (path, binding) in self.bindings.into_entries() {
            let route = format!("/rpc/{path}");
            let path: Arc<str> = Arc::from(path);
            router = match binding {
                Some(Binding::Unary(handler)) => router.route(
                    &route,
                    post(
                        move |State(state): State<AppState>,
                              Extension(context): Extension<RequestContext>,
                              body: Bytes| {
                            call_unary(handler, path, state, context, body)
                        },
                    ),
                ),
                Some(Binding::Stream(handler)) => router.route(
                    &route,
                    get(
                        move |State(state): State<AppState>,
                              Extension(context): Extension<RequestContext>,
                              Query(query): Query<SubscriptionQuery>| {
                            call_stream(handler, path, state, context, query)
                        },
                    ),
                ),
                None => router,
            };
        }

        Ok(router)
    }
}

#[derive(Debug, Deserialize)]
struct SubscriptionQuery {
    input: Option<String>,
}

async fn call_unary(
    handler: UnaryHandler,
    path: Arc<str>,
    state: AppState,
    context: RequestContext,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        empty_input()
    } else {
        serde_json::from_slice(&body).map_err(|error| rejected(&path, invalid_json(error)))?
    };

    handler(state, context, input)
        .await
        .map(Json)
        .map_err(|error| rejected(&path, error))
}

async fn call_stream(
    handler: StreamHandler,
    path: Arc<str>,
    state: AppState,
    context: RequestContext,
    query: SubscriptionQuery,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let input = match query.input.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            serde_json::from_str(raw).map_err(|error| rejected(&path, invalid_json(error)))?
        }
        _ => empty_input(),
    };

    let stream = handler(state, context, input)
        .await
        .map_err(|error| rejected(&path, error))?;
    tracing::info!(path = %path, "subscription opened");

    let events = stream.map(|item| {
        Ok(match item {
            Ok(value) => Event::default().data(value.to_string()),
            Err(error) => Event::default().event("error").data(
                serde_json::to_string(&ErrorResponse::from(&error)).unwrap_or_default(),
            ),
        })
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

fn decode_input<P: Procedure>(value: Value) -> AppResult<P::Input> {
    let input: P::Input = serde_json::from_value(value).map_err(|error| {
        AppError::Validation(format!("invalid input for '{}': {error}", P::PATH))
    })?;
    input.validate()?;
    Ok(input)
}

fn encode_output<P: Procedure>(output: &P::Output) -> AppResult<Value> {
    serde_json::to_value(output).map_err(|error| {
        AppError::Internal(format!("failed to encode output of '{}': {error}", P::PATH))
    })
}

fn empty_input() -> Value {
    Value::Object(Map::new())
}

fn invalid_json(error: serde_json::Error) -> AppError {
    AppError::Validation(format!("request body is not valid JSON: {error}"))
}

fn rejected(path: &str, error: AppError) -> ApiError {
    tracing::warn!(path, code = error.code(), error = %error, "rpc call rejected");
    ApiError(error)
}
