use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::GrantData;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct GrantAccessRequest {
    pub permission_level: String,
}

/// Create or replace the grant of `user_id` on the apiary. Admins only.
pub async fn grant_access<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path((apiary_id, user_id)): Path<(String, String)>,
    Json(body): Json<GrantAccessRequest>,
) -> Result<ApiSuccess<GrantData>, ApiError> {
    let apiary_id = ApiaryId::from_string(&apiary_id).map_err(AccessError::from)?;
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;
    let level: PermissionLevel = body
        .permission_level
        .parse()
        .map_err(AccessError::from)?;

    let grant = state
        .account_service
        .grant_access(&principal.user_id, &user_id, &apiary_id, level)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, (&grant).into()))
}
