use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::Password;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

pub async fn change_password<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = Password::new(body.new_password).map_err(UserError::from)?;

    state
        .account_service
        .change_password(
            &principal.user_id,
            ChangePasswordCommand {
                current_password: body.current_password,
                new_password,
            },
        )
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Password changed"),
    ))
}
