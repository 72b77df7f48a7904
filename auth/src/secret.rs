use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::Digest;
use sha2::Sha256;

/// Random bytes behind every single-use secret (256 bits).
pub const SECRET_TOKEN_BYTES: usize = 32;

/// Generate an unguessable, URL-safe single-use secret.
///
/// # Returns
/// Base64url string (no padding) encoding `SECRET_TOKEN_BYTES` bytes from the OS RNG
pub fn generate_secret_token() -> String {
    let mut bytes = [0u8; SECRET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage fingerprint of a secret token.
///
/// Only the fingerprint is persisted, so a leaked table does not leak usable tokens.
///
/// # Returns
/// Lowercase hex SHA-256 digest
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_full_length() {
        let token = generate_secret_token();

        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let decoded = URL_SAFE_NO_PAD.decode(&token).expect("Token is base64url");
        assert_eq!(decoded.len(), SECRET_TOKEN_BYTES);
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let tokens: HashSet<String> = (0..256).map(|_| generate_secret_token()).collect();
        assert_eq!(tokens.len(), 256);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let token = generate_secret_token();

        assert_eq!(fingerprint(&token), fingerprint(&token));
        assert_ne!(fingerprint(&token), fingerprint("another-token"));
        assert_eq!(fingerprint(&token).len(), 64);
        assert_ne!(fingerprint(&token), token);
    }
}
