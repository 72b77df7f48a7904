use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::AuthenticatedSession;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;

pub mod change_password;
pub mod check_access;
pub mod create_apiary;
pub mod forgot_password;
pub mod get_me;
pub mod grant_access;
pub mod list_grants;
pub mod login;
pub mod register;
pub mod reset_password;
pub mod revoke_access;
pub mod update_me;
pub mod validate_reset_token;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    GatewayTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => ApiError::UnprocessableEntity(msg),
            AccountError::DuplicateIdentity(msg) => ApiError::Conflict(msg),
            AccountError::InvalidCredentials
            | AccountError::InvalidToken
            | AccountError::SessionExpired => ApiError::Unauthorized(err.to_string()),
            AccountError::Forbidden => ApiError::Forbidden(err.to_string()),
            AccountError::InvalidOperation(_) => ApiError::UnprocessableEntity(err.to_string()),
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::Timeout => ApiError::GatewayTimeout(err.to_string()),
            AccountError::Storage(_) | AccountError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        AccountError::from(err).into()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        AccountError::from(err).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of a user. The password hash never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            display_name: user.display_name.as_str().to_string(),
            phone: user.phone.as_ref().map(|p| p.as_str().to_string()),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub user: UserData,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&AuthenticatedSession> for SessionData {
    fn from(session: &AuthenticatedSession) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.access_token.clone(),
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiaryData {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Apiary> for ApiaryData {
    fn from(apiary: &Apiary) -> Self {
        Self {
            id: apiary.id.to_string(),
            owner_id: apiary.owner_id.to_string(),
            name: apiary.name.as_str().to_string(),
            location: apiary.location.clone(),
            created_at: apiary.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantData {
    pub user_id: String,
    pub apiary_id: String,
    pub permission_level: String,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
}

impl From<&AccessGrant> for GrantData {
    fn from(grant: &AccessGrant) -> Self {
        Self {
            user_id: grant.user_id.to_string(),
            apiary_id: grant.apiary_id.to_string(),
            permission_level: grant.level.as_str().to_string(),
            granted_by: grant.granted_by.to_string(),
            granted_at: grant.granted_at,
        }
    }
}

/// Body for operations that only acknowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
