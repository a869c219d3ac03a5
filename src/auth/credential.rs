use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::IdentityConfig;

/// Identity established by the external provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid identity token: {0}")]
    InvalidCredential(String),

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Verifies identity tokens issued by an external identity provider.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, identity_token: &str) -> Result<VerifiedIdentity, CredentialError>;
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Shortest interval between key set fetches triggered by an unknown key id.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    /// Answer from the cache when possible: a known key, or a refusal while
    /// the set is too recent to refetch. `None` means fetch a new set.
    fn lookup(&self, kid: &str, ttl: Duration) -> Option<Result<DecodingKey, CredentialError>> {
        let age = self.fetched_at.elapsed();
        if age >= ttl {
            return None;
        }
        match self.keys.find(kid) {
            Some(jwk) => Some(
                DecodingKey::from_jwk(jwk)
                    .map_err(|e| CredentialError::ProviderUnavailable(e.to_string())),
            ),
            None if age < MIN_REFETCH_INTERVAL => Some(Err(unknown_key(kid))),
            None => None,
        }
    }
}

fn unknown_key(kid: &str) -> CredentialError {
    CredentialError::InvalidCredential(format!("unknown signing key '{}'", kid))
}

/// Verifies Firebase ID tokens against Google's published signing keys.
pub struct FirebaseTokenVerifier {
    project_id: String,
    jwks_url: String,
    cache_ttl: Duration,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            project_id: config.firebase_project_id.clone(),
            jwks_url: config.jwks_url.clone(),
            cache_ttl: Duration::from_secs(config.jwks_cache_secs),
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Find the key for `kid`, refreshing the cached set when stale or when the
    /// key is unknown and the set is older than `MIN_REFETCH_INTERVAL`.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, CredentialError> {
        {
            let cache = self.cache.read().await;
            if let Some(found) = cache.as_ref().and_then(|c| c.lookup(kid, self.cache_ttl)) {
                return found;
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed the set while this one waited
        if let Some(found) = cache.as_ref().and_then(|c| c.lookup(kid, self.cache_ttl)) {
            return found;
        }

        let keys = self.fetch_keys().await?;
        let key = keys.find(kid).map(|jwk| {
            DecodingKey::from_jwk(jwk).map_err(|e| CredentialError::ProviderUnavailable(e.to_string()))
        });
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.unwrap_or_else(|| Err(unknown_key(kid)))
    }

    async fn fetch_keys(&self) -> Result<JwkSet, CredentialError> {
        tracing::debug!("Fetching identity provider keys from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CredentialError::ProviderUnavailable(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| CredentialError::ProviderUnavailable(e.to_string()))
    }
}

#[async_trait]
impl CredentialVerifier for FirebaseTokenVerifier {
    async fn verify(&self, identity_token: &str) -> Result<VerifiedIdentity, CredentialError> {
        if identity_token.trim().is_empty() {
            return Err(CredentialError::InvalidCredential("identity token is empty".to_string()));
        }

        let header = decode_header(identity_token)
            .map_err(|e| CredentialError::InvalidCredential(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(CredentialError::InvalidCredential(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| CredentialError::InvalidCredential("token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        let claims = decode::<FirebaseClaims>(identity_token, &key, &validation)
            .map_err(|e| CredentialError::InvalidCredential(e.to_string()))?
            .claims;

        if claims.sub.is_empty() {
            return Err(CredentialError::InvalidCredential("token has no subject".to_string()));
        }

        Ok(VerifiedIdentity {
            subject_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
        })
    }
}
