/// Bearer token validation for devcommunity services
///
/// Tokens are signed with RS256 (RSA with SHA-256) by the identity service.
/// Content services only hold the public key and validate access tokens;
/// the private key is optional and used by the identity service and tests.
///
/// ## Security Design
///
/// - **RS256 ONLY**: No symmetric algorithms (HS256) to prevent confusion attacks
/// - **No hardcoded keys**: Keys are parsed from PEM supplied by configuration
/// - **No globals**: `JwtKeys` is constructed at startup and injected where needed
///
/// ## Usage
///
/// ```rust,no_run
/// use crypto_core::jwt::JwtKeys;
///
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM").unwrap_or_default();
/// let keys = JwtKeys::from_public_pem(&public_key)?;
/// let developer_id = keys.validate_access_token("eyJ...")?;
/// # Ok::<(), crypto_core::jwt::JwtError>(())
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// JWT algorithm - MUST be RS256
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

/// Only tokens of this type authenticate API requests
pub const ACCESS_TOKEN_TYPE: &str = "access";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("invalid RSA key: {0}")]
    InvalidKey(String),

    #[error("signing key not configured")]
    SigningKeyMissing,

    #[error("token expired")]
    Expired,

    #[error("token validation failed: {0}")]
    Invalid(String),

    #[error("unexpected token type: {0}")]
    WrongTokenType(String),

    #[error("invalid subject in token: {0}")]
    InvalidSubject(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, JwtError>;

/// JWT claims issued by the identity service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (developer id as decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

impl Claims {
    /// Parse the subject as a developer id
    pub fn developer_id(&self) -> Result<i64> {
        match self.sub.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(JwtError::InvalidSubject(self.sub.clone())),
        }
    }
}

/// Parsed key material.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: DecodingKey,
    encoding: Option<EncodingKey>,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("can_sign", &self.encoding.is_some())
            .finish()
    }
}

impl JwtKeys {
    /// Validation-only keys from an RSA public key in PEM format
    pub fn from_public_pem(public_key_pem: &str) -> Result<Self> {
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("public key: {e}")))?;

        Ok(Self {
            decoding,
            encoding: None,
        })
    }

    /// Attach an RSA private key so the keys can also sign tokens
    pub fn with_private_pem(mut self, private_key_pem: &str) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("private key: {e}")))?;
        self.encoding = Some(encoding);
        Ok(self)
    }

    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }

    /// Sign an access token for `developer_id` valid for `ttl`
    pub fn issue_access_token(&self, developer_id: i64, ttl: Duration) -> Result<String> {
        self.issue(developer_id, ACCESS_TOKEN_TYPE, ttl)
    }

    /// Sign a token with an arbitrary `token_type`
    pub fn issue(&self, developer_id: i64, token_type: &str, ttl: Duration) -> Result<String> {
        let encoding = self.encoding.as_ref().ok_or(JwtError::SigningKeyMissing)?;
        let now = Utc::now();

        let claims = Claims {
            sub: developer_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, encoding)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the claims
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }

    /// Validate an access token and return the developer id it authenticates
    pub fn validate_access_token(&self, token: &str) -> Result<i64> {
        let claims = self.decode(token)?;

        if claims.token_type != ACCESS_TOKEN_TYPE {
            debug!(token_type = %claims.token_type, "Rejected non-access token");
            return Err(JwtError::WrongTokenType(claims.token_type));
        }

        claims.developer_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test RSA key pair - FOR TESTING ONLY
    const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_test_private.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/jwt_test_public.pem");
    const OTHER_PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_other_private.pem");

    fn signing_keys() -> JwtKeys {
        JwtKeys::from_public_pem(TEST_PUBLIC_KEY)
            .and_then(|k| k.with_private_pem(TEST_PRIVATE_KEY))
            .expect("Failed to load test keys")
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let keys = signing_keys();
        let token = keys
            .issue_access_token(42, Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(token.matches('.').count(), 2);
        assert_eq!(keys.validate_access_token(&token).unwrap(), 42);
    }

    #[test]
    fn test_validation_only_keys_cannot_sign() {
        let keys = JwtKeys::from_public_pem(TEST_PUBLIC_KEY).unwrap();
        assert!(!keys.can_sign());
        assert!(matches!(
            keys.issue_access_token(1, Duration::hours(1)),
            Err(JwtError::SigningKeyMissing)
        ));
    }

    #[test]
    fn test_validation_only_keys_accept_signed_token() {
        let token = signing_keys()
            .issue_access_token(7, Duration::minutes(5))
            .unwrap();
        let verifier = JwtKeys::from_public_pem(TEST_PUBLIC_KEY).unwrap();

        assert_eq!(verifier.validate_access_token(&token).unwrap(), 7);
    }

    #[test]
    fn test_refresh_token_rejected() {
        let keys = signing_keys();
        let token = keys.issue(3, "refresh", Duration::days(30)).unwrap();

        assert!(matches!(
            keys.validate_access_token(&token),
            Err(JwtError::WrongTokenType(t)) if t == "refresh"
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = signing_keys();
        let token = keys.issue_access_token(3, Duration::hours(-2)).unwrap();

        assert!(matches!(
            keys.validate_access_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_signed_by_other_key_rejected() {
        let forged = JwtKeys::from_public_pem(TEST_PUBLIC_KEY)
            .and_then(|k| k.with_private_pem(OTHER_PRIVATE_KEY))
            .unwrap()
            .issue_access_token(1, Duration::hours(1))
            .unwrap();

        assert!(matches!(
            signing_keys().validate_access_token(&forged),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(signing_keys()
            .validate_access_token("invalid.token.here")
            .is_err());
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "not-a-number".into(),
            iat: 0,
            exp: 0,
            token_type: ACCESS_TOKEN_TYPE.into(),
        };
        assert!(matches!(
            claims.developer_id(),
            Err(JwtError::InvalidSubject(_))
        ));
    }

    #[test]
    fn test_invalid_pem_rejected() {
        assert!(matches!(
            JwtKeys::from_public_pem("not a key"),
            Err(JwtError::InvalidKey(_))
        ));
    }
}
