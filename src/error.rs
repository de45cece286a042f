//! Error handler for the accounts service.

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountError;
use crate::responder::Responder;
use crate::validation::FieldErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(FieldErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("request identifier cannot be generated")]
    MissingCorrelationId,

    #[error("no route matches the request")]
    NotFound,

    #[error("method not allowed on this route")]
    MethodNotAllowed,
}

impl ServerError {
    /// Status code sent back for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Json(rejection) => body_status(rejection.status()),
            ServerError::Form(rejection) => body_status(rejection.status()),
            ServerError::Account(AccountError::AlreadyExists) => StatusCode::CONFLICT,
            ServerError::Account(AccountError::Storage(_))
            | ServerError::MissingCorrelationId => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// Body rejections are reported as 400 unless the media type is wrong or the
/// body is over the size limit.
fn body_status(status: StatusCode) -> StatusCode {
    match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE => status,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Structure of every error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(code: u16, message: &str) -> Self {
        Self {
            code,
            message: message.to_owned(),
            errors: None,
        }
    }

    /// Attach per-field messages.
    pub fn errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ServerError {
    /// Routes render through `AppState::responder`. This is only reached by
    /// a rejection escaping a handler, so it uses the built-in messages.
    fn into_response(self) -> Response {
        Responder::default().error(&self).into_response()
    }
}
