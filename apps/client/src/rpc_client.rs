//! Typed client half of the route contract.
//!
//! [`RpcClient`] maps the same route tree the API serves into one endpoint
//! per procedure, so a call can only name a path the contract defines and
//! its input and output are the procedure's own types.

use std::collections::VecDeque;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use launchpad_contract::{OperationKind, Procedure, RouteTree, Shape};
use launchpad_core::{AppError, AppResult, OrganizationId};
use reqwest::header;
use serde::Deserialize;

mod sse;

use sse::{SseDecoder, SseFrame};

/// Header selecting the organization a call acts within.
const ORGANIZATION_HEADER: &str = "x-organization-id";

/// Lazy stream of subscription items.
pub type Subscription<T> = BoxStream<'static, AppResult<T>>;

#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    kind: OperationKind,
}

/// Error payload returned by the API.
#[derive(Debug, Deserialize)]
struct WireError {
    code: String,
    message: String,
    #[serde(default)]
    path: Option<String>,
}

impl From<WireError> for AppError {
    fn from(value: WireError) -> Self {
        AppError::from_code(&value.code, value.message, value.path)
    }
}

/// Calls procedures of the route contract over HTTP.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http_client: reqwest::Client,
    endpoints: Shape<Endpoint>,
    request_timeout: Option<Duration>,
    token: Option<String>,
    organization_id: Option<OrganizationId>,
}

impl RpcClient {
    /// Creates an anonymous client for every procedure of `tree`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str, tree: &RouteTree) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let endpoints = tree.map(|descriptor| Endpoint {
            url: format!("{base_url}/rpc/{}", descriptor.path),
            kind: descriptor.kind,
        });

        Self {
            http_client,
            endpoints,
            request_timeout: None,
            token: None,
            organization_id: None,
        }
    }

    /// Bounds every query and mutation; subscriptions stay open.
    #[must_use]
    pub fn with_request_timeout(self, timeout: Duration) -> Self {
        Self {
            request_timeout: Some(timeout),
            ..self
        }
    }

    /// Returns a copy that sends `token` as its bearer credential.
    #[must_use]
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Returns a copy acting within `organization_id`.
    #[must_use]
    pub fn with_organization(&self, organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..self.clone()
        }
    }

    /// Returns every path this client can call.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.endpoints.paths()
    }

    /// Calls a query procedure.
    pub async fn query<P: Procedure>(&self, input: &P::Input) -> AppResult<P::Output> {
        let endpoint = self.endpoint::<P>(OperationKind::Query)?;
        self.call_unary::<P>(endpoint, input).await
    }

    /// Calls a mutation procedure.
    pub async fn mutate<P: Procedure>(&self, input: &P::Input) -> AppResult<P::Output> {
        let endpoint = self.endpoint::<P>(OperationKind::Mutation)?;
        self.call_unary::<P>(endpoint, input).await
    }

    /// Opens a subscription; dropping the stream closes the connection.
    pub async fn subscribe<P: Procedure>(
        &self,
        input: &P::Input,
    ) -> AppResult<Subscription<P::Output>> {
        let endpoint = self.endpoint::<P>(OperationKind::Subscription)?;
        let encoded = serde_json::to_string(input).map_err(|error| {
            AppError::Internal(format!("failed to encode input of '{}': {error}", P::PATH))
        })?;

        let response = self
            .authorized(self.http_client.get(&endpoint.url))
            .header(header::ACCEPT, "text/event-stream")
            .query(&[("input", encoded)])
            .send()
            .await
            .map_err(|error| transport_error(P::PATH, &error))?;
        let response = reject_failure(P::PATH, response).await?;

        let path = P::PATH;
        let frames = sse_frames(
            response
                .bytes_stream()
                .map_err(move |error| transport_error(path, &error))
                .boxed(),
        );

        Ok(frames
            .map(move |frame| decode_frame::<P>(frame?))
            .boxed())
    }

    fn endpoint<P: Procedure>(&self, kind: OperationKind) -> AppResult<&Endpoint> {
        let endpoint = self.endpoints.get(P::PATH).ok_or_else(|| {
            AppError::NotFound(format!("procedure '{}' is not part of the route tree", P::PATH))
        })?;

        if endpoint.kind != kind || P::KIND != kind {
            return Err(AppError::Internal(format!(
                "procedure '{}' is a {} and cannot be called as a {kind}",
                P::PATH,
                endpoint.kind
            )));
        }

        Ok(endpoint)
    }

    async fn call_unary<P: Procedure>(
        &self,
        endpoint: &Endpoint,
        input: &P::Input,
    ) -> AppResult<P::Output> {
        let mut request = self.authorized(self.http_client.post(&endpoint.url));
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .json(input)
            .send()
            .await
            .map_err(|error| transport_error(P::PATH, &error))?;
        let response = reject_failure(P::PATH, response).await?;

        response.json::<P::Output>().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to parse response of '{}': {error}",
                P::PATH
            ))
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match &self.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        };
        match self.organization_id {
            Some(organization_id) => {
                request.header(ORGANIZATION_HEADER, organization_id.to_string())
            }
            None => request,
        }
    }
}

/// Turns a non-success response back into the error the API reported.
async fn reject_failure(path: &str, response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_owned());
    Err(match serde_json::from_str::<WireError>(&body) {
        Ok(wire) => wire.into(),
        Err(_) => AppError::Internal(format!(
            "'{path}' returned status {}: {body}",
            status.as_u16()
        )),
    })
}

fn transport_error(path: &str, error: &reqwest::Error) -> AppError {
    AppError::Internal(format!("failed to call '{path}': {error}"))
}

fn decode_frame<P: Procedure>(frame: SseFrame) -> AppResult<P::Output> {
    if frame.event.as_deref() == Some("error") {
        let wire: WireError = serde_json::from_str(&frame.data).map_err(|error| {
            AppError::Internal(format!("malformed error event on '{}': {error}", P::PATH))
        })?;
        return Err(wire.into());
    }

    serde_json::from_str(&frame.data).map_err(|error| {
        AppError::Internal(format!("malformed event on '{}': {error}", P::PATH))
    })
}

fn sse_frames<S, B>(chunks: S) -> BoxStream<'static, AppResult<SseFrame>>
where
    S: Stream<Item = AppResult<B>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = (chunks, SseDecoder::default(), VecDeque::new());
    stream::unfold(state, |(mut chunks, mut decoder, mut pending)| async move {
        loop {
            if let Some(frame) = pending.pop_front() {
                return Some((Ok(frame), (chunks, decoder, pending)));
            }
            match chunks.next().await {
                Some(Ok(chunk)) => pending.extend(decoder.push(chunk.as_ref())),
                Some(Err(error)) => return Some((Err(error), (chunks, decoder, pending))),
                None => return None,
            }
        }
    })
    .boxed()
}
