//! JWT token generation and validation
//!
//! Tokens carry `{user_id, username, exp}` and are signed with an HMAC
//! secret that is resolved once at startup. Keys are pre-computed and
//! shared behind `Arc` so cloning the service per request is cheap.

use crate::config::{JwtConfig, FALLBACK_JWT_SECRET};
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token was rejected. Callers collapse all of these into one
/// unauthorized response; the variant is only for logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not signed with an HMAC algorithm")]
    AlgorithmMismatch,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::AlgorithmMismatch
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Pre-computed JWT keys
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Issues and validates bearer tokens
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    validation: Arc<Validation>,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a service for an explicit secret
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        // Any HMAC variant is accepted; RSA/EC headers fail before the
        // signature is looked at.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys: JwtKeys::new(secret),
            validation: Arc::new(validation),
            ttl_secs,
        }
    }

    /// Build the service from configuration, falling back to the built-in
    /// secret with a warning when none is configured.
    pub fn from_config(config: &JwtConfig) -> Self {
        if config.uses_fallback_secret() {
            warn!(
                "No JWT secret configured (BOOKSHELF__JWT__SECRET); signing tokens with the \
                 built-in fallback secret. Anyone who knows it can forge tokens."
            );
            Self::new(FALLBACK_JWT_SECRET, config.token_ttl_secs)
        } else {
            Self::new(config.secret.expose_secret(), config.token_ttl_secs)
        }
    }

    /// Issue a token for a user, valid for the configured lifetime
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let exp = Utc::now() + Duration::seconds(self.ttl_secs);
        let claims = Claims {
            user_id,
            username: username.to_string(),
            exp: exp.timestamp(),
        };
        self.sign(&claims, Algorithm::HS256)
    }

    pub(crate) fn sign(&self, claims: &Claims, algorithm: Algorithm) -> Result<String> {
        encode(&Header::new(algorithm), claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Verify signature, algorithm family and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test-secret";

    fn create_test_service() -> TokenService {
        TokenService::new(TEST_SECRET, 3600)
    }

    fn claims_expiring_at(exp: i64) -> Claims {
        Claims {
            user_id: 7,
            username: "alice".to_string(),
            exp,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue(42, "alice").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_expiry_matches_ttl() {
        let service = TokenService::new(TEST_SECRET, 72 * 3600);
        let before = Utc::now().timestamp();
        let claims = service.validate(&service.issue(1, "bob").unwrap()).unwrap();

        assert!(claims.exp >= before + 72 * 3600);
        assert!(claims.exp <= Utc::now().timestamp() + 72 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_test_service().issue(1, "alice").unwrap();
        let other = TokenService::new("another-secret", 3600);

        assert_eq!(other.validate(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();
        let expired = claims_expiring_at(Utc::now().timestamp() - 1);
        let token = service.sign(&expired, Algorithm::HS256).unwrap();

        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_hmac_variants_accepted() {
        let service = create_test_service();
        let claims = claims_expiring_at(Utc::now().timestamp() + 60);

        for algorithm in [Algorithm::HS384, Algorithm::HS512] {
            let token = service.sign(&claims, algorithm).unwrap();
            assert_eq!(service.validate(&token).unwrap(), claims);
        }
    }

    #[test]
    fn test_non_hmac_header_rejected() {
        let service = create_test_service();
        let token = service.issue(1, "alice").unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        // {"alg":"RS256","typ":"JWT"}
        let forged = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", rest);

        assert_eq!(service.validate(&forged), Err(TokenError::AlgorithmMismatch));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = create_test_service();

        assert_eq!(service.validate("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(service.validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_fallback_secret_used_when_unconfigured() {
        let from_config = TokenService::from_config(&JwtConfig::default());
        let fallback = TokenService::new(FALLBACK_JWT_SECRET, 60);

        let token = from_config.issue(3, "carol").unwrap();
        assert_eq!(fallback.validate(&token).unwrap().user_id, 3);
    }

    #[test]
    fn test_configured_secret_used() {
        let service = TokenService::from_config(&JwtConfig::with_secret("configured"));
        let token = service.issue(3, "carol").unwrap();

        let fallback = TokenService::new(FALLBACK_JWT_SECRET, 60);
        assert!(fallback.validate(&token).is_err());
        assert!(TokenService::new("configured", 60).validate(&token).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_issue_validate_roundtrip(user_id in 1i64..i64::MAX, username in "\\PC{1,40}") {
            let service = create_test_service();
            let token = service.issue(user_id, &username).unwrap();
            let claims = service.validate(&token).unwrap();
            prop_assert_eq!(claims.user_id, user_id);
            prop_assert_eq!(claims.username, username);
        }

        #[test]
        fn prop_foreign_secret_never_validates(secret in "[a-z0-9]{8,32}") {
            prop_assume!(secret != TEST_SECRET);
            let token = TokenService::new(&secret, 3600).issue(1, "alice").unwrap();
            prop_assert!(create_test_service().validate(&token).is_err());
        }
    }
}
