use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::domain::access::errors::AccessError;
use crate::domain::password_reset::errors::ResetTokenError;
use crate::domain::user::errors::UserError;

/// Error for outbound mail delivery
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailerError {
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("Mail transport failed: {0}")]
    TransportFailed(String),
}

/// External error taxonomy of the account subsystem.
///
/// Storage and internal details are kept for logging only; callers at the
/// HTTP boundary replace them with a generic message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DuplicateIdentity(String),

    /// Unknown account and wrong password alike.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Session expired")]
    SessionExpired,

    #[error("Insufficient permissions for this apiary")]
    Forbidden,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<UserError> for AccountError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_)
            | UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidDisplayName(_)
            | UserError::InvalidPhone(_)
            | UserError::InvalidPassword(_) => AccountError::Validation(err.to_string()),
            UserError::NotFound(_) => AccountError::NotFound(err.to_string()),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                AccountError::DuplicateIdentity(err.to_string())
            }
            UserError::DatabaseError(msg) => AccountError::Storage(msg),
        }
    }
}

impl From<ResetTokenError> for AccountError {
    fn from(err: ResetTokenError) -> Self {
        match err {
            ResetTokenError::Invalid => AccountError::InvalidToken,
            ResetTokenError::UserNotFound(_) => AccountError::NotFound(err.to_string()),
            ResetTokenError::DatabaseError(msg) => AccountError::Storage(msg),
        }
    }
}

impl From<AccessError> for AccountError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidApiaryId(_)
            | AccessError::InvalidPermissionLevel(_)
            | AccessError::InvalidApiaryName(_) => AccountError::Validation(err.to_string()),
            AccessError::Forbidden => AccountError::Forbidden,
            AccessError::InvalidOperation(msg) => AccountError::InvalidOperation(msg),
            AccessError::DatabaseError(msg) => AccountError::Storage(msg),
        }
    }
}

impl From<JwtError> for AccountError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AccountError::SessionExpired,
            JwtError::InvalidToken(_) | JwtError::MissingClaim(_) => AccountError::InvalidToken,
            JwtError::EncodingFailed(_) | JwtError::UnsupportedAlgorithm(_) => {
                AccountError::Internal(err.to_string())
            }
        }
    }
}

impl From<PasswordError> for AccountError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong { .. } => AccountError::Validation(err.to_string()),
            PasswordError::HashingFailed(_) | PasswordError::VerificationFailed(_) => {
                AccountError::Internal(err.to_string())
            }
        }
    }
}
