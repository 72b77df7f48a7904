use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::UserId;

/// Persisted reset token row.
///
/// Only the fingerprint of the secret is stored; the plaintext exists once,
/// in the mail sent to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: TokenFingerprint,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// Whether `validate` would accept this row at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

/// SHA-256 hex fingerprint of a plaintext reset token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenFingerprint(String);

impl TokenFingerprint {
    pub fn of(plaintext: &str) -> Self {
        Self(auth::secret::fingerprint(plaintext))
    }

    /// Wrap a fingerprint read back from storage.
    pub fn from_stored(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Freshly issued token. The plaintext is only available here.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedResetToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedResetToken")
            .field("token", &"**redacted**")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of marking a token used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The token was live and is now used.
    Consumed,
    /// The token was already used (or superseded); nothing changed.
    AlreadyUsed,
    /// Unknown or expired token.
    Invalid,
}
