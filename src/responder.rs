//! Turns handler results into HTTP responses.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};

use crate::config::ErrorMessages;
use crate::error::{ErrorResponse, Result, ServerError};
use crate::router::extract::{CorrelationId, X_REQUEST_ID};

/// Renders errors with the configured message table and stamps the
/// correlation identifier on every response.
#[derive(Debug, Clone, Default)]
pub struct Responder {
    messages: Arc<ErrorMessages>,
}

impl Responder {
    pub fn new(messages: ErrorMessages) -> Self {
        Self {
            messages: Arc::new(messages),
        }
    }

    /// Build the body of an error.
    pub fn error(&self, err: &ServerError) -> ErrorResponse {
        let status = err.status();
        let code = status.as_u16();
        if status.is_server_error() {
            tracing::error!(error = %err, code, "server returned error status");
        }

        let response = ErrorResponse::new(code, self.messages.get(code));
        if let ServerError::Validation(errors) = err {
            response.errors(errors.clone())
        } else {
            response
        }
    }

    /// Render `result` and attach the `X-Request-Id` header.
    pub fn respond<T: IntoResponse>(
        &self,
        result: Result<T>,
        correlation_id: &CorrelationId,
    ) -> Response {
        let mut response = match result {
            Ok(ok) => ok.into_response(),
            Err(err) => self.error(&err).into_response(),
        };

        response
            .headers_mut()
            .insert(X_REQUEST_ID, correlation_id.header_value().clone());
        response
    }
}
