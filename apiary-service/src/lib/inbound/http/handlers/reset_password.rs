use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::Password;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    new_password: String,
}

pub async fn reset_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = Password::new(body.new_password).map_err(UserError::from)?;

    state
        .account_service
        .reset_password(ResetPasswordCommand {
            token: body.token,
            new_password,
        })
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Password has been reset"),
    ))
}
