use std::sync::Arc;

use auth::Clock;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::password_reset::errors::ResetTokenError;
use crate::domain::password_reset::models::ConsumeOutcome;
use crate::domain::password_reset::models::IssuedResetToken;
use crate::domain::password_reset::models::ResetToken;
use crate::domain::password_reset::models::TokenFingerprint;
use crate::domain::password_reset::ports::ResetTokenRepository;
use crate::domain::user::models::UserId;

/// Password reset token manager.
///
/// State machine per token: issued → used | superseded | expired. All three
/// end states look the same to [`PasswordResetService::validate`].
pub struct PasswordResetService<TR>
where
    TR: ResetTokenRepository,
{
    repository: Arc<TR>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<TR> PasswordResetService<TR>
where
    TR: ResetTokenRepository,
{
    /// # Arguments
    /// * `repository` - Token persistence implementation
    /// * `clock` - Time source for issuing and expiry
    /// * `ttl` - Lifetime of a freshly issued token
    pub fn new(repository: Arc<TR>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            repository,
            clock,
            ttl,
        }
    }

    /// Issue a new token for `user_id`, superseding any outstanding one.
    ///
    /// # Returns
    /// The plaintext token; this is the only time it is available
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    pub async fn issue_for(&self, user_id: &UserId) -> Result<IssuedResetToken, ResetTokenError> {
        let now = self.clock.now();
        let plaintext = auth::secret::generate_secret_token();
        let expires_at = now + self.ttl;

        let token = ResetToken {
            id: Uuid::new_v4(),
            user_id: *user_id,
            token_hash: TokenFingerprint::of(&plaintext),
            expires_at,
            used: false,
            created_at: now,
        };

        self.repository.issue(token).await?;
        tracing::info!(user_id = %user_id, expires_at = %expires_at, "Password reset token issued");

        Ok(IssuedResetToken {
            token: plaintext,
            user_id: *user_id,
            expires_at,
        })
    }

    /// Check a token without consuming it.
    ///
    /// # Errors
    /// * `Invalid` - Token is unknown, used, superseded or expired
    /// * `DatabaseError` - Database operation failed
    pub async fn validate(&self, token: &str) -> Result<UserId, ResetTokenError> {
        self.repository
            .find_redeemable(&TokenFingerprint::of(token), self.clock.now())
            .await?
            .ok_or(ResetTokenError::Invalid)
    }

    /// Mark a token used. Consuming twice is harmless and reports `AlreadyUsed`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn consume(&self, token: &str) -> Result<ConsumeOutcome, ResetTokenError> {
        let outcome = self
            .repository
            .consume(&TokenFingerprint::of(token), self.clock.now())
            .await?;
        tracing::debug!(outcome = ?outcome, "Password reset token consumed");
        Ok(outcome)
    }

    /// Atomically store `new_password_hash` for the token's owner and consume the token.
    ///
    /// # Errors
    /// * `Invalid` - Token is not redeemable
    /// * `DatabaseError` - Database operation failed
    pub async fn redeem(
        &self,
        token: &str,
        new_password_hash: &str,
    ) -> Result<UserId, ResetTokenError> {
        let user_id = self
            .repository
            .redeem(&TokenFingerprint::of(token), new_password_hash, self.clock.now())
            .await?;
        tracing::info!(user_id = %user_id, "Password reset token redeemed");
        Ok(user_id)
    }

    /// Store a new password hash for a user and supersede all of their
    /// outstanding tokens, atomically.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    pub async fn replace_password(
        &self,
        user_id: &UserId,
        new_password_hash: &str,
    ) -> Result<u64, ResetTokenError> {
        let superseded = self
            .repository
            .replace_password(user_id, new_password_hash, self.clock.now())
            .await?;
        if superseded > 0 {
            tracing::info!(user_id = %user_id, superseded, "Outstanding reset tokens superseded");
        }
        Ok(superseded)
    }
}
