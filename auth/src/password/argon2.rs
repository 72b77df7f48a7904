use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;
use super::legacy;

/// Password hash formats this hasher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    /// Current scheme: Argon2id in PHC string format.
    Argon2,
    /// Verification-only bcrypt hashes carried over from earlier deployments.
    LegacyBcrypt,
    /// Anything else. Never verifies.
    Unknown,
}

impl HashScheme {
    /// Classify a stored hash by its prefix.
    pub fn detect(hash: &str) -> Self {
        if hash.starts_with("$argon2") {
            HashScheme::Argon2
        } else if legacy::is_bcrypt(hash) {
            HashScheme::LegacyBcrypt
        } else {
            HashScheme::Unknown
        }
    }
}

/// Password hashing implementation.
///
/// Hashes with Argon2id and a random per-call salt embedded in the PHC output.
/// Legacy bcrypt hashes can still be verified so that accounts created before
/// the switch keep working until they are re-hashed.
pub struct PasswordHasher;

impl PasswordHasher {
    /// Upper bound on accepted password size, to cap hashing cost.
    pub const MAX_PASSWORD_BYTES: usize = 1024;

    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password securely.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `TooLong` - Password exceeds `MAX_PASSWORD_BYTES`
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > Self::MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                max: Self::MAX_PASSWORD_BYTES,
                actual: password.len(),
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Oversized passwords never match and are rejected before any hashing work.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash (Argon2 PHC string or legacy bcrypt)
    ///
    /// # Returns
    /// True if password matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid or unrecognised
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        if password.len() > Self::MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        match HashScheme::detect(hash) {
            HashScheme::Argon2 => {
                let parsed_hash = PasswordHash::new(hash).map_err(|e| {
                    PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
                })?;

                Ok(Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok())
            }
            HashScheme::LegacyBcrypt => legacy::verify(password, hash),
            HashScheme::Unknown => Err(PasswordError::VerificationFailed(
                "Unrecognised password hash format".to_string(),
            )),
        }
    }

    /// Whether a stored hash should be replaced with a fresh Argon2id hash.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        HashScheme::detect(hash) != HashScheme::Argon2
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
