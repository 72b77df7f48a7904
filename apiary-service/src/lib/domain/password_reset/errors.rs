use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    /// Unknown, used, superseded or expired: deliberately indistinguishable.
    #[error("Invalid or expired reset token")]
    Invalid,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
