use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use crate::AppState;
use crate::account::Account;
use crate::error::{Result, ServerError};
use crate::router::extract::CorrelationId;
use crate::validation::{AccountCreationRequest, ValidationOutcome};

/// Handler to create an account.
pub async fn handler(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    body: Result<AccountCreationRequest>,
) -> Response {
    let result = create(&state, body).await;
    state.responder.respond(result, &correlation_id)
}

async fn create(
    state: &AppState,
    body: Result<AccountCreationRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let new_account = match state.validator.validate(&body?) {
        ValidationOutcome::Valid(new_account) => new_account,
        ValidationOutcome::Invalid(errors) => {
            for field in errors.fields() {
                metrics::counter!("account_validation_failures_total", "field" => field.as_str())
                    .increment(1);
            }
            tracing::debug!(
                fields = ?errors.fields().collect::<Vec<_>>(),
                "account creation rejected"
            );
            return Err(ServerError::Validation(errors));
        },
    };

    let account = state.accounts.create(new_account).await?;
    metrics::counter!("accounts_created_total").increment(1);
    tracing::info!(sub = %account.sub, "account created");

    Ok((StatusCode::CREATED, Json(account)))
}
