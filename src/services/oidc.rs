//! OpenID Connect provider plumbing: discovery, signing keys and token verification

use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    config::{HostMapping, VerificationConfig},
    error::AppError,
    models::auth::Claims,
};

/// Errors raised while talking to the identity provider or checking its tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("code exchange failed: {0}")]
    Exchange(String),

    #[error("token response has no id_token")]
    MissingIdToken,

    #[error("token verification failed: {0}")]
    Verification(String),

    #[error("cannot build URL: {0}")]
    UrlConstruction(String),

    #[error("provider discovery failed: {0}")]
    Discovery(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Verification(msg) => {
                tracing::debug!("Token rejected: {}", msg);
                AppError::Authentication("Invalid or expired token".to_string())
            }
            AuthError::UrlConstruction(msg) => AppError::Internal(msg),
            e @ (AuthError::Exchange(_) | AuthError::MissingIdToken | AuthError::Discovery(_)) => {
                AppError::Upstream(e.to_string())
            }
        }
    }
}

/// Subset of the provider's `.well-known/openid-configuration`
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

impl ProviderMetadata {
    pub async fn discover(http: &reqwest::Client, realm_url: &str) -> Result<Self, AuthError> {
        let url = format!(
            "{}/.well-known/openid-configuration",
            realm_url.trim_end_matches('/')
        );
        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::Discovery(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Discovery(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        response
            .json::<Self>()
            .await
            .map_err(|e| AuthError::Discovery(format!("invalid metadata from {}: {}", url, e)))
    }
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Option<Instant>,
}

/// Provider signing keys, fetched lazily and refreshed when a token names an
/// unknown `kid`.
pub struct JwksCache {
    http: reqwest::Client,
    uri: String,
    min_refresh: Duration,
    keys: RwLock<CachedKeys>,
}

impl JwksCache {
    pub fn new(http: reqwest::Client, uri: impl Into<String>) -> Self {
        Self {
            http,
            uri: uri.into(),
            min_refresh: Duration::from_secs(10),
            keys: RwLock::new(CachedKeys {
                set: JwkSet { keys: Vec::new() },
                fetched_at: None,
            }),
        }
    }

    /// Minimum time between two fetches triggered by unknown key ids
    pub fn with_min_refresh(mut self, interval: Duration) -> Self {
        self.min_refresh = interval;
        self
    }

    pub async fn key_for(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.lookup(kid).await? {
            return Ok(key);
        }
        if self.refresh_due().await {
            self.refresh().await?;
            if let Some(key) = self.lookup(kid).await? {
                return Ok(key);
            }
        }
        Err(AuthError::Verification(format!(
            "no signing key matches kid {:?}",
            kid
        )))
    }

    async fn lookup(&self, kid: Option<&str>) -> Result<Option<DecodingKey>, AuthError> {
        let cached = self.keys.read().await;
        let jwk = match kid {
            Some(kid) => cached.set.find(kid),
            None if cached.set.keys.len() == 1 => cached.set.keys.first(),
            None => None,
        };
        jwk.map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| AuthError::Verification(format!("unusable signing key: {}", e)))
    }

    async fn refresh_due(&self) -> bool {
        match self.keys.read().await.fetched_at {
            None => true,
            Some(at) => at.elapsed() >= self.min_refresh,
        }
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        tracing::debug!("Fetching signing keys from {}", self.uri);
        let set = self
            .http
            .get(&self.uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::Verification(format!("cannot fetch signing keys: {}", e)))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::Verification(format!("invalid signing key set: {}", e)))?;

        let mut cached = self.keys.write().await;
        cached.set = set;
        cached.fetched_at = Some(Instant::now());
        Ok(())
    }
}

/// Where verification keys come from
pub enum KeySource {
    Jwks(JwksCache),
    /// A fixed key, used for shared-secret setups
    Static(DecodingKey),
}

impl KeySource {
    async fn key_for(&self, kid: Option<&str>) -> Result<DecodingKey, AuthError> {
        match self {
            KeySource::Jwks(cache) => cache.key_for(kid).await,
            KeySource::Static(key) => Ok(key.clone()),
        }
    }
}

/// What a token must satisfy besides a valid signature and expiry
#[derive(Debug, Clone)]
pub struct VerificationPolicy {
    pub algorithms: Vec<Algorithm>,
    /// Accepted `iss` values; `None` skips the issuer check
    pub issuers: Option<Vec<String>>,
    /// Required `aud` value; `None` skips the audience check
    pub audience: Option<String>,
    pub leeway_secs: u64,
}

impl VerificationPolicy {
    /// Build a policy from configuration.
    ///
    /// The accepted issuers are the discovered one, the same issuer seen
    /// through the external host, and any allowlisted extras.
    pub fn from_config(
        config: &VerificationConfig,
        issuer: &str,
        mapping: &HostMapping,
        audience: Option<&str>,
    ) -> Result<Self, AuthError> {
        let algorithms = config
            .algorithms
            .iter()
            .map(|name| {
                Algorithm::from_str(name).map_err(|_| {
                    AuthError::Verification(format!("unknown signing algorithm {}", name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if algorithms.is_empty() {
            return Err(AuthError::Verification(
                "no signing algorithm allowed".to_string(),
            ));
        }

        let issuers = if config.skip_issuer_check {
            None
        } else {
            let mut accepted = vec![issuer.to_string()];
            let external = mapping.rewrite_str(issuer);
            for candidate in std::iter::once(external).chain(config.issuer_allowlist.iter().cloned()) {
                if !accepted.contains(&candidate) {
                    accepted.push(candidate);
                }
            }
            Some(accepted)
        };

        Ok(Self {
            algorithms,
            issuers,
            audience: audience.map(str::to_string),
            leeway_secs: config.leeway_secs,
        })
    }

    fn validation(&self, alg: Algorithm) -> Result<Validation, AuthError> {
        if !self.algorithms.contains(&alg) {
            return Err(AuthError::Verification(format!(
                "algorithm {:?} is not allowed",
                alg
            )));
        }

        let mut validation = Validation::new(alg);
        validation.leeway = self.leeway_secs;
        if let Some(issuers) = &self.issuers {
            validation.set_issuer(issuers.as_slice());
        }
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Ok(validation)
    }
}

/// Turns a raw bearer or ID token into verified claims
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Verifies provider-signed JWTs against a key source and a policy
pub struct OidcVerifier {
    keys: KeySource,
    policy: VerificationPolicy,
}

impl OidcVerifier {
    pub fn new(keys: KeySource, policy: VerificationPolicy) -> Self {
        Self { keys, policy }
    }
}

#[async_trait]
impl TokenVerifier for OidcVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::Verification(format!("malformed token: {}", e)))?;
        let validation = self.policy.validation(header.alg)?;
        let key = self.keys.key_for(header.kid.as_deref()).await?;

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AuthError::Verification(e.to_string()))?;
        data.claims
            .validate()
            .map_err(|e| AuthError::Verification(e.to_string()))?;
        Ok(data.claims)
    }
}
