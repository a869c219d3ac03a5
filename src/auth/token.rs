use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ConfigError, SecurityConfig};

/// Session tokens are valid for ten hours from issuance.
pub const SESSION_LIFETIME_HOURS: i64 = 10;

/// HMAC keys shorter than this are refused at startup.
const MIN_KEY_BYTES: usize = 32;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A decoded, signature-checked session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed session token: {0}")]
    Malformed(String),

    #[error("Session token signature is invalid")]
    BadSignature,

    #[error("Session token has expired")]
    Expired,

    #[error("Session token could not be issued: {0}")]
    Issue(String),
}

/// Process-wide HMAC key, derived once from the configured base64 secret.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Decode a base64 secret. The HMAC variant follows the key length.
    pub fn from_base64(secret: &str) -> Result<Self, ConfigError> {
        let bytes = BASE64_STANDARD
            .decode(secret.trim())
            .map_err(|e| ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("not valid base64: {}", e),
            })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < MIN_KEY_BYTES {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!(
                    "decoded key is {} bytes, at least {} are required",
                    bytes.len(),
                    MIN_KEY_BYTES
                ),
            });
        }

        let algorithm = match bytes.len() {
            n if n >= 64 => Algorithm::HS512,
            n if n >= 48 => Algorithm::HS384,
            _ => Algorithm::HS256,
        };

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Issues and checks the signed session tokens handed out by the auth endpoints.
#[derive(Debug, Clone)]
pub struct SessionTokenCodec {
    key: SigningKey,
    lifetime: Duration,
}

impl SessionTokenCodec {
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            lifetime: Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, ConfigError> {
        if security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        Ok(Self::new(SigningKey::from_base64(&security.jwt_secret)?))
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::Issue("subject is empty".to_string()));
        }

        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        encode(&Header::new(self.key.algorithm), &claims, &self.key.encoding)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    /// Check signature and expiry and return the token's contents.
    pub fn decode(&self, token: &str) -> Result<SessionToken, TokenError> {
        let mut validation = Validation::new(self.key.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(token, &self.key.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed("token carries no subject".to_string()));
        }

        let issued_at = DateTime::<Utc>::from_timestamp(claims.iat, 0)
            .ok_or_else(|| TokenError::Malformed("issued-at out of range".to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed("expiry out of range".to_string()))?;

        // The library accepts exp == now; a token is already expired at that instant.
        if Utc::now() >= expires_at {
            return Err(TokenError::Expired);
        }

        Ok(SessionToken {
            subject: claims.sub,
            issued_at,
            expires_at,
        })
    }

    /// True once the expiry has been reached. Other decode failures are returned as errors.
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        match self.decode(token) {
            Ok(decoded) => Ok(Utc::now() >= decoded.expires_at),
            Err(TokenError::Expired) => Ok(true),
            Err(other) => Err(other),
        }
    }

    /// True iff the token decodes, names `expected_subject` and is unexpired.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        match self.decode(token) {
            Ok(decoded) => decoded.subject == expected_subject && Utc::now() < decoded.expires_at,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                false
            }
        }
    }
}
