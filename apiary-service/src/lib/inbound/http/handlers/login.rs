use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SessionData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    /// Username, or email when it contains `@`.
    identifier: String,
    password: String,
}

pub async fn login<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    let session = state
        .account_service
        .login(&body.identifier, &body.password)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, (&session).into()))
}
