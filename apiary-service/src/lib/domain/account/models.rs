use std::time::Duration as StdDuration;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::access::models::Apiary;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Immutable settings for the account flows, built once at startup.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Deadline for each flow; on expiry the flow is dropped and its
    /// transaction rolled back.
    pub request_timeout: StdDuration,
    pub reset_token_ttl: Duration,
    /// Default reset link template, `{token}` marks the token position.
    pub reset_url: String,
}

/// Command to register a new account with validated fields
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub display_name: DisplayName,
    pub phone: Option<PhoneNumber>,
    pub password: Password,
    /// Apiary to create for the new user, if any.
    pub apiary: Option<ProvisionApiaryCommand>,
}

/// Command to finish a password reset
#[derive(Debug)]
pub struct ResetPasswordCommand {
    pub token: String,
    pub new_password: Password,
}

/// Command to change the password of a signed-in user
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: Password,
}

/// Signed session handed to a user after login or registration.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: User,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub session: AuthenticatedSession,
    pub apiary: Option<Apiary>,
}

/// Identity recovered from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrincipal {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
}
