use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateResetTokenRequest {
    token: String,
}

/// Lets a reset form check its link before asking for a new password.
/// The token stays usable.
pub async fn validate_reset_token<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ValidateResetTokenRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .account_service
        .validate_reset_token(&body.token)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, MessageData::new("Token is valid")))
}
