use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryId;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Revoking an absent grant succeeds as well.
pub async fn revoke_access<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path((apiary_id, user_id)): Path<(String, String)>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let apiary_id = ApiaryId::from_string(&apiary_id).map_err(AccessError::from)?;
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    state
        .account_service
        .revoke_access(&principal.user_id, &user_id, &apiary_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Access revoked"),
    ))
}
