use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiSuccess;
use super::MessageData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}

/// Always answers 202 with the same body, whether or not the address exists.
/// The link template is the configured one; callers cannot supply their own.
pub async fn forgot_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiSuccess<MessageData> {
    state.account_service.forgot_password(&body.email, None).await;

    ApiSuccess::new(
        StatusCode::ACCEPTED,
        MessageData::new("If the address is registered, a reset link has been sent"),
    )
}
