use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::ApiaryData;
use super::SessionData;
use crate::domain::access::errors::AccessError;
use crate::domain::access::models::ApiaryName;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to the username.
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub apiary_name: Option<String>,
    pub apiary_location: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let username = Username::new(self.username).map_err(UserError::from)?;
        let email = EmailAddress::new(self.email).map_err(UserError::from)?;
        let password = Password::new(self.password).map_err(UserError::from)?;
        let display_name = DisplayName::new(
            self.display_name
                .unwrap_or_else(|| username.as_str().to_string()),
        )
        .map_err(UserError::from)?;
        let phone = self
            .phone
            .filter(|p| !p.trim().is_empty())
            .map(PhoneNumber::new)
            .transpose()
            .map_err(UserError::from)?;

        let apiary = self
            .apiary_name
            .map(|name| -> Result<ProvisionApiaryCommand, AccessError> {
                Ok(ProvisionApiaryCommand {
                    name: ApiaryName::new(name)?,
                    location: self.apiary_location,
                })
            })
            .transpose()?;

        Ok(RegisterCommand {
            username,
            email,
            display_name,
            phone,
            password,
            apiary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    #[serde(flatten)]
    pub session: SessionData,
    pub apiary: Option<ApiaryData>,
}

pub async fn register<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let command = body.try_into_command()?;

    let registration = state.account_service.register(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        RegisterResponseData {
            session: (&registration.session).into(),
            apiary: registration.apiary.as_ref().map(ApiaryData::from),
        },
    ))
}
