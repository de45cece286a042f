//! HTTP routes.

pub mod create;
pub mod extract;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use crate::AppState;
use crate::error::ServerError;
use extract::CorrelationId;

/// Fallback for unknown routes.
pub async fn not_found(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Response {
    state
        .responder
        .respond::<()>(Err(ServerError::NotFound), &correlation_id)
}

/// Fallback for known routes called with another method.
pub async fn method_not_allowed(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Response {
    state
        .responder
        .respond::<()>(Err(ServerError::MethodNotAllowed), &correlation_id)
}

/// Prometheus text exposition.
pub async fn metrics(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Response {
    let result = match &state.metrics {
        Some(handle) => Ok((StatusCode::OK, handle.render())),
        None => Err(ServerError::NotFound),
    };
    state.responder.respond(result, &correlation_id)
}
