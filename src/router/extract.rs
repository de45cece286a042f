//! Custom extractors.

use axum::Json;
use axum::extract::{Form, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, header};
use serde::Deserialize;
use serde_json::Value;
use tower_http::request_id::RequestId;
use uuid::Uuid;

use crate::error::ServerError;
use crate::validation::AccountCreationRequest;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Drop an `X-Request-Id` header carrying no identifier, so the request-id
/// layer generates one instead of propagating a blank value.
pub async fn drop_blank_request_id(mut req: Request) -> Request {
    if req.headers().get(X_REQUEST_ID).is_some_and(is_blank) {
        req.headers_mut().remove(X_REQUEST_ID);
    }
    req
}

fn is_blank(value: &HeaderValue) -> bool {
    value.as_bytes().iter().all(u8::is_ascii_whitespace)
}

/// Request identifier set by the upstream request-id layer, or generated
/// here when the request reached the handler without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(HeaderValue);

impl CorrelationId {
    pub fn new(value: HeaderValue) -> Self {
        Self(value)
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let found = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.header_value())
            .or_else(|| parts.headers.get(X_REQUEST_ID))
            .filter(|value| !is_blank(value))
            .cloned();
        if let Some(value) = found {
            return Ok(Self(value));
        }

        let value = HeaderValue::from_str(&Uuid::new_v4().to_string())
            .map_err(|_| ServerError::MissingCorrelationId)?;
        parts.extensions.insert(RequestId::new(value.clone()));
        Ok(Self(value))
    }
}

/// Form bodies only carry strings.
#[derive(Deserialize)]
struct FormFields {
    email: Option<String>,
    password: Option<String>,
    email_verified: Option<String>,
}

impl From<FormFields> for AccountCreationRequest {
    fn from(fields: FormFields) -> Self {
        Self {
            email: fields.email.map(Value::String),
            password: fields.password.map(Value::String),
            email_verified: fields.email_verified.map(Value::String),
        }
    }
}

/// Accepts JSON and URL-encoded form bodies.
impl<S> FromRequest<S> for AccountCreationRequest
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_URLENCODED));

        if is_form {
            let Form(fields) = Form::<FormFields>::from_request(req, state).await?;
            Ok(fields.into())
        } else {
            let Json(request) = Json::<Self>::from_request(req, state).await?;
            Ok(request)
        }
    }
}
