//! Reverse-proxy gateway in front of the contact list API.
//!
//! Every request is forwarded to the configured backend. Upstream timeouts,
//! throttling and server errors are retried with exponential backoff before
//! the failure is surfaced to the caller.

use anyhow::Result;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use contact_list::config::Config;
use contact_list::error::ContactListError;
use contact_list::retry::{Backoff, HttpTransientClassifier, RetryExecutor, RetryPolicy};

static HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.contains(&name)
}

struct GatewayState {
    http: reqwest::Client,
    backend: String,
    retry: RetryExecutor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .build()?;

    let retry = RetryExecutor::new(
        RetryPolicy::new(
            config.gateway.max_retries,
            Duration::from_millis(config.gateway.base_delay_ms),
        )
        .with_backoff(Backoff::Exponential),
        Arc::new(HttpTransientClassifier),
    );

    let state = Arc::new(GatewayState {
        http,
        backend: config.gateway.backend_url.trim_end_matches('/').to_string(),
        retry,
    });

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .fallback(forward)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!("gateway", method = %req.method(), uri = %req.uri())
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(config.gateway.bind.as_str()).await?;
    tracing::info!(
        bind = %config.gateway.bind,
        backend = %config.gateway.backend_url,
        "Starting contact list gateway"
    );

    axum::serve(listener, router).await?;
    Ok(())
}

async fn forward(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Reject methods that can enable tunneling or reflection.
    if method == Method::CONNECT || method == Method::TRACE {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let url = format!("{}{}", state.backend, path_and_query);

    let mut upstream_headers = HeaderMap::new();
    for (name, value) in headers.iter() {
        let name_str = name.as_str().to_lowercase();
        if name_str == "host" || is_hop_by_hop(&name_str) {
            continue;
        }
        upstream_headers.insert(name, value.clone());
    }

    // The body is buffered up front so every attempt replays the same request.
    let operation = || {
        let request = state
            .http
            .request(method.clone(), url.as_str())
            .headers(upstream_headers.clone())
            .body(body.clone());
        async move {
            let response = request.send().await.map_err(send_error)?;
            let status = response.status().as_u16();
            if HttpTransientClassifier::retryable_status(status) {
                return Err(ContactListError::Upstream { status });
            }
            Ok(response)
        }
    };

    let operation_name = format!("forward {}", uri.path());
    let response = match state.retry.execute_async(operation, &operation_name).await {
        Ok(response) => response,
        Err(err) => return err.into_response(),
    };

    let status = response.status();
    let mut response_headers = HeaderMap::new();
    for (name, value) in response.headers().iter() {
        if is_hop_by_hop(&name.as_str().to_lowercase()) {
            continue;
        }
        response_headers.insert(name, value.clone());
    }

    match response.bytes().await {
        Ok(bytes) => (status, response_headers, bytes).into_response(),
        Err(err) => {
            tracing::error!("Failed to read upstream body: {err}");
            ContactListError::Upstream { status: 502 }.into_response()
        }
    }
}

fn send_error(err: reqwest::Error) -> ContactListError {
    let status = if err.is_timeout() { 504 } else { 502 };
    tracing::warn!("Upstream request failed ({status}): {err}");
    ContactListError::Upstream { status }
}
