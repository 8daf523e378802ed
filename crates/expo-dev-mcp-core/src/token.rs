//! Bearer token for the HTTP transport.
//!
//! The token lives for the lifetime of the process and is never written to
//! disk. Generated tokens are 32 random bytes encoded as unpadded base64url.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use crate::{Error, Result};

const TOKEN_BYTES: usize = 32;

/// Shared secret expected in `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap a caller-provided token.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::InvalidInput("token cannot be empty".to_string()));
        }
        Ok(Self(value))
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare a presented token without short-circuiting on the first mismatch.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "{prefix}****")
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = AuthToken::generate();
        assert_eq!(token.as_str().len(), 43);
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(AuthToken::generate(), AuthToken::generate());
    }

    #[test]
    fn test_verify() {
        let token = AuthToken::new("s3cret-token").unwrap();
        assert!(token.verify("s3cret-token"));
        assert!(!token.verify("s3cret-tokem"));
        assert!(!token.verify("s3cret"));
        assert!(!token.verify(""));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(AuthToken::new("   "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_display_masks_value() {
        let token = AuthToken::new("abcdefghijkl").unwrap();
        assert_eq!(token.to_string(), "abcd****");
        assert_eq!(format!("{token:?}"), "AuthToken(abcd****)");
    }
}
