//! Account registration API.
//!
//! `POST /v1/accounts` validates every field of the payload and either
//! creates the account or answers `422` with the messages of each rejected
//! field.

#![forbid(unsafe_code)]

pub mod account;
pub mod config;
pub mod error;
pub mod responder;
mod router;
pub mod telemetry;
pub mod validation;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

pub use account::{AccountCreator, MemoryAccounts};
pub use error::ServerError;
use responder::Responder;
use validation::AccountValidator;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Same as [`make_request`], with an URL-encoded `POST` body.
#[cfg(test)]
pub async fn make_form_request(
    app: Router,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub validator: Arc<AccountValidator>,
    pub responder: Responder,
    pub accounts: Arc<dyn AccountCreator>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the state from a loaded configuration.
    pub fn new(
        config: Arc<config::Configuration>,
        accounts: Arc<dyn AccountCreator>,
    ) -> Self {
        Self {
            validator: Arc::new(AccountValidator::new(&config.rules)),
            responder: Responder::new(config.error_messages.clone()),
            config,
            accounts,
            metrics: None,
        }
    }

    /// Expose metrics on `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.rules.body_limit();

    let middleware = ServiceBuilder::new()
        // A blank `X-Request-Id` counts as absent.
        .layer(AxumMiddleware::map_request(router::extract::drop_blank_request_id))
        // Generate `X-Request-Id` when the client did not send one.
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(
                        size_bytes = chunk.len(),
                        latency = ?latency,
                        "sending body chunk"
                    )
                })
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(true)
                        .level(tracing::Level::INFO),
                )
                .on_request(DefaultOnRequest::new())
                .on_response(
                    DefaultOnResponse::new()
                        .include_headers(true)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .expose_headers([router::extract::X_REQUEST_ID]),
        );

    Router::new()
        // `POST /v1/accounts` goes to `create`.
        .route("/v1/accounts", post(router::create::handler))
        // `GET /metrics` goes to `metrics`.
        .route("/metrics", get(router::metrics))
        .fallback(router::not_found)
        .method_not_allowed_fallback(router::method_not_allowed)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub fn initialize_state(
    accounts: Arc<dyn AccountCreator>,
) -> Result<AppState, config::ConfigError> {
    // read configuration file. let it in memory.
    let path: PathBuf = std::env::var("CONFIG_PATH").map(Into::into).unwrap_or_default();
    let config = config::Configuration::default().path(path).read()?;

    tracing::info!(
        name = %config.name,
        email_max_length = config.rules.email.max_length,
        password_min_length = config.rules.password.min_length,
        password_max_length = config.rules.password.max_length,
        "configuration loaded"
    );

    Ok(AppState::new(config, accounts))
}
