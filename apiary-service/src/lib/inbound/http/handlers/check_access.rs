use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckAccessQuery {
    /// Required level; omitted means "just tell me my level".
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessData {
    pub apiary_id: String,
    pub permission_level: String,
}

/// Answer 403 unless the caller holds at least `level`, otherwise report the
/// caller's effective level.
pub async fn check_access<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(apiary_id): Path<String>,
    Query(query): Query<CheckAccessQuery>,
) -> Result<ApiSuccess<AccessData>, ApiError> {
    let apiary_id = ApiaryId::from_string(&apiary_id).map_err(AccessError::from)?;

    if let Some(level) = query.level {
        let level: PermissionLevel = level.parse().map_err(AccessError::from)?;
        state
            .account_service
            .check_access(&principal.user_id, &apiary_id, level)
            .await?;
    }

    let effective = state
        .account_service
        .effective_level(&principal.user_id, &apiary_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AccessData {
            apiary_id: apiary_id.to_string(),
            permission_level: effective.as_str().to_string(),
        },
    ))
}
