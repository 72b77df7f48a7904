use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Apiary;
use crate::domain::access::models::ApiaryId;
use crate::domain::access::models::PermissionLevel;
use crate::domain::access::models::ProvisionApiaryCommand;
use crate::domain::access::ports::AccessRepository;
use crate::domain::access::service::AccessService;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::AccountSettings;
use crate::domain::account::models::AuthenticatedSession;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::models::Registration;
use crate::domain::account::models::ResetPasswordCommand;
use crate::domain::account::models::SessionPrincipal;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::Mailer;
use crate::domain::password_reset::models::IssuedResetToken;
use crate::domain::password_reset::ports::ResetTokenRepository;
use crate::domain::password_reset::service::PasswordResetService;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::UserService;

const RESET_MAIL_SUBJECT: &str = "Reset your Apiary password";
const TOKEN_PLACEHOLDER: &str = "{token}";

/// Account orchestrator.
///
/// Composes the credential store, the reset token manager and the access
/// registry into the register / login / reset / authorize flows, and is the
/// only component that talks to the mailer.
pub struct AccountService<UR, TR, AR, M>
where
    UR: UserRepository,
    TR: ResetTokenRepository,
    AR: AccessRepository,
    M: Mailer,
{
    users: UserService<UR>,
    resets: PasswordResetService<TR>,
    access: AccessService<AR>,
    mailer: Arc<M>,
    authenticator: Arc<Authenticator>,
    settings: AccountSettings,
}

impl<UR, TR, AR, M> AccountService<UR, TR, AR, M>
where
    UR: UserRepository,
    TR: ResetTokenRepository,
    AR: AccessRepository,
    M: Mailer,
{
    /// Create the orchestrator with injected dependencies.
    ///
    /// # Arguments
    /// * `user_repository` - Credential store persistence
    /// * `token_repository` - Reset token persistence
    /// * `access_repository` - Apiary and grant persistence
    /// * `mailer` - Outbound mail delivery
    /// * `authenticator` - Hashing, session signing and the shared clock
    /// * `settings` - Deadlines, TTLs and the reset link template
    pub fn new(
        user_repository: Arc<UR>,
        token_repository: Arc<TR>,
        access_repository: Arc<AR>,
        mailer: Arc<M>,
        authenticator: Arc<Authenticator>,
        settings: AccountSettings,
    ) -> Self {
        let clock = authenticator.clock();
        Self {
            users: UserService::new(user_repository, Arc::clone(&clock)),
            resets: PasswordResetService::new(
                token_repository,
                Arc::clone(&clock),
                settings.reset_token_ttl,
            ),
            access: AccessService::new(access_repository, clock),
            mailer,
            authenticator,
            settings,
        }
    }

    /// Run a flow under the configured deadline. Dropping the flow on expiry
    /// drops any open transaction with it.
    async fn within_deadline<T>(
        &self,
        operation: &'static str,
        flow: impl Future<Output = Result<T, AccountError>>,
    ) -> Result<T, AccountError> {
        match tokio::time::timeout(self.settings.request_timeout, flow).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.settings.request_timeout.as_millis() as u64,
                    "Account operation timed out"
                );
                Err(AccountError::Timeout)
            }
        }
    }

    async fn hash_plaintext(&self, password: String) -> Result<String, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AccountError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(AccountError::from)
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool, AccountError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let stored_hash = user.password_hash.clone();

        let verified = tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, &stored_hash)
        })
        .await
        .map_err(|e| AccountError::Internal(format!("Verification task failed: {}", e)))?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Stored password hash cannot be verified");
                Ok(false)
            }
        }
    }

    async fn burn_dummy_verification(&self, password: &str) {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let _ = tokio::task::spawn_blocking(move || authenticator.verify_against_dummy(&password))
            .await;
    }

    async fn upgrade_legacy_hash(&self, user: &User, password: &str) {
        if !self.authenticator.needs_rehash(&user.password_hash) {
            return;
        }

        let stored = match self.hash_plaintext(password.to_string()).await {
            Ok(hash) => self.users.update_password_hash(&user.id, &hash).await,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to re-hash legacy password");
                return;
            }
        };

        match stored {
            Ok(()) => tracing::info!(user_id = %user.id, "Legacy password hash upgraded"),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to store upgraded password hash")
            }
        }
    }

    fn open_session(&self, user: User) -> Result<AuthenticatedSession, AccountError> {
        let issued = self.authenticator.issue_session(
            user.id,
            user.username.as_str(),
            user.email.as_str(),
        )?;

        Ok(AuthenticatedSession {
            user,
            access_token: issued.access_token,
            expires_at: issued.expires_at,
        })
    }

    async fn register_flow(&self, command: RegisterCommand) -> Result<Registration, AccountError> {
        if self
            .users
            .find_by_identifier(command.username.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::UsernameAlreadyExists(command.username.to_string()).into());
        }
        if self.users.find_by_email(&command.email).await?.is_some() {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()).into());
        }

        let password_hash = self
            .hash_plaintext(command.password.expose().to_string())
            .await?;
        let now = self.authenticator.now();

        let user = self
            .users
            .create(User {
                id: UserId::new(),
                username: command.username,
                email: command.email,
                password_hash,
                display_name: command.display_name,
                phone: command.phone,
                profile_picture: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        let apiary = match command.apiary {
            None => None,
            Some(apiary) => match self.access.provision_apiary(&user.id, apiary).await {
                Ok(apiary) => Some(apiary),
                Err(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Apiary provisioning failed, removing new user");
                    if let Err(cleanup) = self.users.delete(&user.id).await {
                        tracing::error!(user_id = %user.id, error = %cleanup, "Failed to remove user after provisioning failure");
                    }
                    return Err(e.into());
                }
            },
        };

        let session = self.open_session(user)?;
        Ok(Registration { session, apiary })
    }

    async fn login_flow(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AccountError> {
        let Some(user) = self.users.find_by_identifier(identifier).await? else {
            self.burn_dummy_verification(password).await;
            tracing::info!("Login rejected: unknown identifier");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.verify_password(&user, password).await? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        self.upgrade_legacy_hash(&user, password).await;

        tracing::info!(user_id = %user.id, "User logged in");
        self.open_session(user)
    }

    async fn forgot_password_flow(
        &self,
        email: &str,
        reset_url: Option<&str>,
    ) -> Result<(), AccountError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            tracing::debug!("Password reset requested for malformed address");
            return Ok(());
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::info!("Password reset requested for unknown address");
            return Ok(());
        };

        let issued = self.resets.issue_for(&user.id).await?;
        let template = reset_url.unwrap_or(&self.settings.reset_url);
        let body = reset_mail_body(&user, &issued, &render_reset_link(template, &issued.token));

        if let Err(e) = self.mailer.send(&user.email, RESET_MAIL_SUBJECT, &body).await {
            tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset mail");
        }
        Ok(())
    }

    async fn reset_password_flow(&self, command: ResetPasswordCommand) -> Result<(), AccountError> {
        // Reject dead tokens before paying for a hash.
        self.resets.validate(&command.token).await?;

        let password_hash = self
            .hash_plaintext(command.new_password.expose().to_string())
            .await?;
        let user_id = self.resets.redeem(&command.token, &password_hash).await?;

        tracing::info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    async fn change_password_flow(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        let user = self.users.get(user_id).await?;
        if !self.verify_password(&user, &command.current_password).await? {
            return Err(AccountError::InvalidCredentials);
        }

        let password_hash = self
            .hash_plaintext(command.new_password.expose().to_string())
            .await?;
        self.resets.replace_password(user_id, &password_hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

#[async_trait]
impl<UR, TR, AR, M> AccountServicePort for AccountService<UR, TR, AR, M>
where
    UR: UserRepository,
    TR: ResetTokenRepository,
    AR: AccessRepository,
    M: Mailer,
{
    async fn register(&self, command: RegisterCommand) -> Result<Registration, AccountError> {
        self.within_deadline("register", self.register_flow(command))
            .await
    }

    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AccountError> {
        self.within_deadline("login", self.login_flow(identifier, password))
            .await
    }

    async fn forgot_password(&self, email: &str, reset_url: Option<&str>) {
        let result = self
            .within_deadline("forgot_password", self.forgot_password_flow(email, reset_url))
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Password reset request failed");
        }
    }

    async fn validate_reset_token(&self, token: &str) -> Result<(), AccountError> {
        self.within_deadline("validate_reset_token", async {
            self.resets.validate(token).await?;
            Ok(())
        })
        .await
    }

    async fn reset_password(&self, command: ResetPasswordCommand) -> Result<(), AccountError> {
        self.within_deadline("reset_password", self.reset_password_flow(command))
            .await
    }

    async fn authorize(&self, token: &str) -> Result<SessionPrincipal, AccountError> {
        let claims = self.authenticator.verify_session(token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AccountError::from(e)
        })?;

        let subject = claims.sub.as_deref().ok_or(AccountError::InvalidToken)?;
        let user_id = UserId::from_string(subject).map_err(|_| AccountError::InvalidToken)?;

        Ok(SessionPrincipal {
            user_id,
            username: claims.username().unwrap_or_default(),
            email: claims.email().unwrap_or_default(),
            expires_at: claims.expires_at(),
        })
    }

    async fn check_access(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        level: PermissionLevel,
    ) -> Result<(), AccountError> {
        self.within_deadline("check_access", async {
            Ok(self.access.require_at_least(user_id, apiary_id, level).await?)
        })
        .await
    }

    async fn effective_level(
        &self,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<PermissionLevel, AccountError> {
        self.within_deadline("effective_level", async {
            Ok(self.access.effective_level(user_id, apiary_id).await?)
        })
        .await
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        self.within_deadline("change_password", self.change_password_flow(user_id, command))
            .await
    }

    async fn current_user(&self, user_id: &UserId) -> Result<User, AccountError> {
        self.within_deadline("current_user", async { Ok(self.users.get(user_id).await?) })
            .await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<User, AccountError> {
        self.within_deadline("update_profile", async {
            Ok(self.users.update_profile(user_id, command).await?)
        })
        .await
    }

    async fn create_apiary(
        &self,
        owner_id: &UserId,
        command: ProvisionApiaryCommand,
    ) -> Result<Apiary, AccountError> {
        self.within_deadline("create_apiary", async {
            Ok(self.access.provision_apiary(owner_id, command).await?)
        })
        .await
    }

    async fn grant_access(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
        level: PermissionLevel,
    ) -> Result<AccessGrant, AccountError> {
        self.within_deadline("grant_access", async {
            Ok(self
                .access
                .grant(actor_id, user_id, apiary_id, level)
                .await?)
        })
        .await
    }

    async fn revoke_access(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<(), AccountError> {
        self.within_deadline("revoke_access", async {
            Ok(self.access.revoke(actor_id, user_id, apiary_id).await?)
        })
        .await
    }

    async fn list_access(
        &self,
        actor_id: &UserId,
        apiary_id: &ApiaryId,
    ) -> Result<Vec<AccessGrant>, AccountError> {
        self.within_deadline("list_access", async {
            Ok(self.access.list_grants(actor_id, apiary_id).await?)
        })
        .await
    }
}

/// Insert `token` into a reset link template.
///
/// Templates without a `{token}` placeholder get the token appended as a
/// `token` query parameter.
pub fn render_reset_link(template: &str, token: &str) -> String {
    if template.contains(TOKEN_PLACEHOLDER) {
        template.replace(TOKEN_PLACEHOLDER, token)
    } else if template.contains('?') {
        format!("{}&token={}", template, token)
    } else {
        format!("{}?token={}", template, token)
    }
}

fn reset_mail_body(user: &User, issued: &IssuedResetToken, link: &str) -> String {
    format!(
        "Hello {name},\n\n\
         We received a request to reset the password of your Apiary account.\n\
         Open the link below to choose a new password. It can be used once and \
         expires at {expires} UTC.\n\n\
         {link}\n\n\
         If you did not ask for this, you can ignore this message.\n",
        name = user.display_name.as_str(),
        expires = issued.expires_at.format("%Y-%m-%d %H:%M"),
        link = link,
    )
}
