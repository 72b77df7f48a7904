use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::password_reset::errors::ResetTokenError;
use crate::domain::password_reset::models::ConsumeOutcome;
use crate::domain::password_reset::models::ResetToken;
use crate::domain::password_reset::models::TokenFingerprint;
use crate::domain::user::models::UserId;

/// Persistence for password reset tokens.
///
/// Every method is a single atomic unit; a failure leaves no partial state.
#[async_trait]
pub trait ResetTokenRepository: Send + Sync + 'static {
    /// Supersede every unused token of `token.user_id`, then store `token`.
    ///
    /// Two concurrent calls for the same user must serialise so that only one
    /// unused token remains afterwards.
    ///
    /// # Errors
    /// * `UserNotFound` - Owning user does not exist
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    async fn issue(&self, token: ResetToken) -> Result<(), ResetTokenError>;

    /// Owner of a token that is unused and not yet expired at `now`.
    ///
    /// # Returns
    /// `None` for unknown, used, superseded and expired tokens alike
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_redeemable(
        &self,
        token_hash: &TokenFingerprint,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, ResetTokenError>;

    /// Mark a token used.
    ///
    /// # Returns
    /// * `Consumed` - Token was redeemable and is now used
    /// * `AlreadyUsed` - Token exists but was already used
    /// * `Invalid` - Token is unknown or expired
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn consume(
        &self,
        token_hash: &TokenFingerprint,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome, ResetTokenError>;

    /// Re-validate a token, store the new password hash for its owner and
    /// mark the token used, all in one transaction.
    ///
    /// # Returns
    /// Owner of the redeemed token
    ///
    /// # Errors
    /// * `Invalid` - Token is not redeemable at `now`
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    async fn redeem(
        &self,
        token_hash: &TokenFingerprint,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, ResetTokenError>;

    /// Store a new password hash for `user_id` and mark every unused token of
    /// that user used, in one transaction.
    ///
    /// # Returns
    /// Number of tokens superseded
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed (nothing was changed)
    async fn replace_password(
        &self,
        user_id: &UserId,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, ResetTokenError>;
}
