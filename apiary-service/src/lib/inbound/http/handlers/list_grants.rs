use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::GrantData;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryId;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_grants<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(apiary_id): Path<String>,
) -> Result<ApiSuccess<Vec<GrantData>>, ApiError> {
    let apiary_id = ApiaryId::from_string(&apiary_id).map_err(AccessError::from)?;

    let grants = state
        .account_service
        .list_access(&principal.user_id, &apiary_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        grants.iter().map(GrantData::from).collect(),
    ))
}
