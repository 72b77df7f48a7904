use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::ApiaryData;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryName;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateApiaryRequest {
    pub name: String,
    pub location: Option<String>,
}

pub async fn create_apiary<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(principal): Extension<AuthenticatedUser>,
    Json(body): Json<CreateApiaryRequest>,
) -> Result<ApiSuccess<ApiaryData>, ApiError> {
    let command = ProvisionApiaryCommand {
        name: ApiaryName::new(body.name).map_err(AccessError::from)?,
        location: body.location,
    };

    let apiary = state
        .account_service
        .create_apiary(&principal.user_id, command)
        .await?;

    tracing::info!(apiary_id = %apiary.id, owner = %principal.username, "Apiary created");
    Ok(ApiSuccess::new(StatusCode::CREATED, (&apiary).into()))
}
