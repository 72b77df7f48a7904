use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiaryIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionLevelError {
    #[error("Unknown permission level: {0} (expected none, read, write or admin)")]
    Unknown(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiaryNameError {
    #[error("Apiary name must not be empty")]
    Empty,

    #[error("Apiary name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for access control operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Invalid apiary ID: {0}")]
    InvalidApiaryId(#[from] ApiaryIdError),

    #[error("Invalid permission level: {0}")]
    InvalidPermissionLevel(#[from] PermissionLevelError),

    #[error("Invalid apiary name: {0}")]
    InvalidApiaryName(#[from] ApiaryNameError),

    /// Also returned for apiaries that do not exist.
    #[error("Insufficient permissions for this apiary")]
    Forbidden,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
