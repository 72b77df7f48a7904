use async_trait::async_trait;

use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::account::errors::AccountError;
use crate::domain::account::errors::MailerError;
use crate::domain::account::models::AuthenticatedSession;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Registration;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for the account orchestrator, consumed by the HTTP layer.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Create an account (and optionally an owned apiary) and sign it in.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is taken
    /// * `Validation` - Input does not satisfy the account rules
    /// * `Storage` / `Timeout` - Infrastructure failure
    async fn register(&self, command: RegisterCommand) -> Result<Registration, AccountError>;

    /// Sign in with a username or email (`@` selects email) and a password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password
    /// * `Storage` / `Timeout` - Infrastructure failure
    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AccountError>;

    /// Start a password reset. Always succeeds from the caller's point of
    /// view; unknown addresses and internal failures are only logged.
    ///
    /// # Arguments
    /// * `email` - Address the reset is requested for
    /// * `reset_url` - Link template with a `{token}` placeholder; the
    ///   configured template is used when absent
    async fn forgot_password(&self, email: &str, reset_url: Option<&str>);

    /// Check a reset token without consuming it.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is unknown, used, superseded or expired
    async fn validate_reset_token(&self, token: &str) -> Result<(), AccountError>;

    /// Set a new password with a reset token and consume the token.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is unknown, used, superseded or expired
    /// * `Validation` - New password does not satisfy the policy
    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError>;

    /// Verify a bearer session token.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, forged or missing claims
    /// * `SessionExpired` - Token reached its expiry
    async fn authorize(&self, token: &str) -> Result<SessionPrincipal, AccountError>;

    /// Require at least `level` on an apiary.
    ///
    /// # Errors
    /// * `Forbidden` - Level too low or apiary does not exist
    async fn check_access(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        level: PermissionLevel,
    ) -> Result<(), AccountError>;

    /// Level a user holds on an apiary.
    async fn effective_level(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<PermissionLevel, AccountError>;

    /// Change the password of a signed-in user; outstanding reset tokens die.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Current password is wrong
    /// * `Validation` - New password does not satisfy the policy
    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;

    /// # Errors
    /// * `NotFound` - User no longer exists
    async fn current_user(&self, user_id: &UserId) -> Result<User, AccountError>;

    /// # Errors
    /// * `NotFound` - User no longer exists
    async fn update_profile(
        &self,
        user_id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, AccountError>;

    /// Create an apiary owned by `owner_id`.
    async fn create_apiary(
        &self,
        owner_id: &UserId,
        command: ProvisionApiaryCommand,
    ) -> Result<Apiary, AccountError>;

    /// # Errors
    /// * `Forbidden` - Actor is not admin on the apiary
    /// * `InvalidOperation` - Self-grant, owner target, or level `none`
    async fn grant_access(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        level: PermissionLevel,
    ) -> Result<AccessGrant, AccountError>;

    /// # Errors
    /// * `Forbidden` - Actor is not admin on the apiary
    /// * `InvalidOperation` - Self-revoke or owner target
    async fn revoke_access(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<(), AccountError>;

    /// # Errors
    /// * `Forbidden` - Actor cannot read the apiary
    async fn list_access(
        &self,
        actor_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<Vec<AccessGrant>, AccountError>;
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver a plain-text message.
    ///
    /// # Errors
    /// * `InvalidAddress` - Sender or recipient rejected
    /// * `BuildFailed` - Message could not be assembled
    /// * `TransportFailed` - Delivery failed
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), MailerError>;
}
