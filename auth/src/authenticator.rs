use std::sync::Arc;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session tokens.
///
/// Holds the immutable signing material, session lifetime and clock for the
/// whole process. Cheap to share behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    session_ttl: Duration,
    clock: Arc<dyn Clock>,
    dummy_hash: OnceLock<String>,
}

/// Result of successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Instant after which the token is rejected
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_handler` - Configured signer/verifier
    /// * `session_ttl` - Lifetime of issued session tokens
    /// * `clock` - Time source for issuing and expiry checks
    pub fn new(jwt_handler: JwtHandler, session_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler,
            session_ttl,
            clock,
            dummy_hash: OnceLock::new(),
        }
    }

    /// HS256 authenticator on the system clock.
    pub fn with_secret(jwt_secret: &[u8], session_ttl: Duration) -> Self {
        Self::new(JwtHandler::new(jwt_secret), session_ttl, Arc::new(SystemClock))
    }

    /// Current instant according to the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Shared handle to the injected clock.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Configured session lifetime.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Password too long or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Whether a stored hash uses a superseded scheme.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        self.password_hasher.needs_rehash(stored_hash)
    }

    /// Spend the same work as a real verification without any account.
    ///
    /// Used when the looked-up account does not exist so that response timing
    /// does not reveal it.
    pub fn verify_against_dummy(&self, password: &str) {
        let hash = self.dummy_hash.get_or_init(|| {
            self.password_hasher
                .hash("dummy-password-for-timing")
                .unwrap_or_default()
        });
        let _ = self.password_hasher.verify(password, hash);
    }

    /// Verify credentials and issue a session token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Subject of the session
    /// * `username` - Display claim
    /// * `email` - Display claim
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: impl ToString,
        username: &str,
        email: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_session(user_id, username, email)?)
    }

    /// Issue a session token without password verification.
    ///
    /// Used right after registration or a verified login.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_session(
        &self,
        user_id: impl ToString,
        username: &str,
        email: &str,
    ) -> Result<AuthenticationResult, JwtError> {
        let issued_at = self.clock.now();
        let claims = Claims::for_user(user_id, username, email, issued_at, self.session_ttl);
        let access_token = self.jwt_handler.encode(&claims)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at: issued_at + self.session_ttl,
        })
    }

    /// Verify a session token and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or bad signature
    /// * `MissingClaim` - Token lacks `sub` or `exp`
    /// * `TokenExpired` - `exp` is at or before the current instant
    pub fn verify_session(&self, token: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.sub.is_none() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }
        if claims.exp.is_none() {
            return Err(JwtError::MissingClaim("exp".to_string()));
        }
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
