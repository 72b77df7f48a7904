use super::errors::PasswordError;

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Whether `hash` was produced by the bcrypt scheme used before Argon2id.
pub(super) fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Verify a password against a legacy bcrypt hash.
///
/// Only verification is supported; new hashes are always Argon2id.
pub(super) fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash)
        .map_err(|e| PasswordError::VerificationFailed(format!("Invalid legacy hash: {}", e)))
}
