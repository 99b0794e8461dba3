//! JWKS (JSON Web Key Set) fetching with optional caching.
//!
//! With a TTL of zero every lookup refetches the key set from the identity
//! provider. A positive TTL keeps the decoded keys for that long, refetching
//! early only when a token names a key id that is not cached.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Default timeout for a JWKS request, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// A single JSON Web Key from a JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA")
    pub kty: String,
    /// Key ID, matched against the JWT header `kid`
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256")
    pub alg: Option<String>,
    /// Key use (e.g., "sig" for signature)
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    /// RSA modulus (base64url encoded)
    pub n: Option<String>,
    /// RSA exponent (base64url encoded)
    pub e: Option<String>,
}

/// A JWKS document containing multiple keys.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksDocument {
    pub keys: Vec<Jwk>,
}

struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// Source of verification keys for one JWKS endpoint.
pub struct JwksCache {
    jwks_url: String,
    cache_ttl: Duration,
    cached: RwLock<Option<KeySet>>,
    client: reqwest::Client,
}

impl JwksCache {
    /// Create a key source. `cache_ttl_seconds == 0` disables caching.
    pub fn new(
        jwks_url: String,
        cache_ttl_seconds: u64,
        fetch_timeout_seconds: u64,
    ) -> Result<Self, JwksError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch_timeout_seconds))
            .build()
            .map_err(|e| JwksError::FetchError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            jwks_url,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            cached: RwLock::new(None),
            client,
        })
    }

    /// Get the decoding key for `kid`.
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        if !self.cache_ttl.is_zero() {
            let cached = self.cached.read().await;
            if let Some(set) = cached.as_ref()
                && set.fetched_at.elapsed() <= self.cache_ttl
                && let Some(key) = set.keys.get(kid)
            {
                return Ok(key.clone());
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();

        if !self.cache_ttl.is_zero() {
            *self.cached.write().await = Some(KeySet {
                keys,
                fetched_at: Instant::now(),
            });
        }

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    /// Fetch and decode every usable key from the JWKS endpoint.
    pub async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwksDocument = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        Ok(decode_key_set(jwks))
    }
}

/// Keep RSA signing keys that carry a key id, keyed by that id.
fn decode_key_set(jwks: JwksDocument) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();

    for jwk in jwks.keys {
        let Some(kid) = jwk.kid.clone() else {
            debug!("Skipping JWK without kid");
            continue;
        };

        if jwk.kty != "RSA" {
            debug!("Skipping non-RSA key {}: {}", kid, jwk.kty);
            continue;
        }

        if jwk.key_use.as_deref() == Some("enc") {
            debug!("Skipping encryption key {}", kid);
            continue;
        }

        match jwk_to_decoding_key(&jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(e) => warn!("Failed to parse JWK {}: {}", kid, e),
        }
    }

    keys
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, JwksError> {
    let n = jwk
        .n
        .as_ref()
        .ok_or_else(|| JwksError::ParseError("Missing 'n' in RSA key".to_string()))?;
    let e = jwk
        .e
        .as_ref()
        .ok_or_else(|| JwksError::ParseError("Missing 'e' in RSA key".to_string()))?;

    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| JwksError::ParseError(format!("Invalid RSA components: {}", e)))
}

/// Errors that can occur when resolving a verification key.
#[derive(Debug, Clone)]
pub enum JwksError {
    /// Failed to fetch JWKS from endpoint.
    FetchError(String),
    /// Failed to parse JWKS response.
    ParseError(String),
    /// No key in the set matches the requested kid.
    KeyNotFound(String),
}

impl fmt::Display for JwksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchError(msg) => write!(f, "Failed to fetch JWKS: {}", msg),
            Self::ParseError(msg) => write!(f, "Failed to parse JWKS: {}", msg),
            Self::KeyNotFound(kid) => write!(f, "Key not found: {}", kid),
        }
    }
}

impl std::error::Error for JwksError {}
