//! Bearer token verification against the identity provider's key set.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::error::AuthError;
use crate::auth::jwks::{DEFAULT_FETCH_TIMEOUT_SECONDS, JwksCache, JwksError};

/// Identity provider domain used when none is configured.
pub const DEFAULT_AUTH_DOMAIN: &str = "cjohannb.eu.auth0.com";

/// API audience used when none is configured.
pub const DEFAULT_AUDIENCE: &str = "coffee_shop";

/// Authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.eu.auth0.com`
    pub domain: String,
    /// Expected `aud` claim
    pub audience: String,
    /// JWKS endpoint; derived from `domain` when unset
    pub jwks_url: Option<String>,
    /// How long fetched keys are reused; 0 refetches on every request
    pub jwks_cache_seconds: u64,
    /// Timeout for the JWKS request
    pub jwks_timeout_seconds: u64,
    /// Report the specific verification failure to clients instead of a
    /// generic 401
    pub fine_grained_errors: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_AUTH_DOMAIN.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            jwks_url: None,
            jwks_cache_seconds: 0,
            jwks_timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECONDS,
            fine_grained_errors: false,
        }
    }
}

impl AuthConfig {
    /// Expected `iss` claim: `https://{domain}/`.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    /// The configured JWKS URL, or the provider's well-known location.
    pub fn jwks_endpoint(&self) -> Result<String, JwksError> {
        if let Some(url) = &self.jwks_url {
            return Ok(url.clone());
        }

        Url::parse(&self.issuer())
            .and_then(|base| base.join(".well-known/jwks.json"))
            .map(String::from)
            .map_err(|e| JwksError::FetchError(format!("invalid auth domain '{}': {}", self.domain, e)))
    }
}

/// Claims read from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,
    /// Granted API permissions
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<u64>,
}

/// Verifies RS256 access tokens issued by the configured identity provider.
pub struct TokenVerifier {
    config: AuthConfig,
    jwks: JwksCache,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Result<Self, JwksError> {
        let jwks = JwksCache::new(
            config.jwks_endpoint()?,
            config.jwks_cache_seconds,
            config.jwks_timeout_seconds,
        )?;

        Ok(Self { config, jwks })
    }

    pub fn fine_grained_errors(&self) -> bool {
        self.config.fine_grained_errors
    }

    /// Verify signature, audience, issuer and expiry of `token`.
    ///
    /// `aud` and `iss` must be present. `exp` is checked only when the token
    /// carries one.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = self.jwks.get_key(&kid).await.map_err(|e| match e {
            JwksError::KeyNotFound(kid) => AuthError::KeyNotFound(kid),
            other => AuthError::JwksUnavailable(other.to_string()),
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["aud", "iss"]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims(e.to_string()),
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        debug!(
            "Token verified for subject: {}",
            data.claims.sub.as_deref().unwrap_or("<none>")
        );
        Ok(data.claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let parts: Vec<&str> = authorization
        .map(|h| h.split_whitespace().collect())
        .unwrap_or_default();

    match parts.as_slice() {
        [] => Err(AuthError::HeaderMissing),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::InvalidScheme),
        [_, token] => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Check that `claims` grant `permission`.
pub fn check_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissions)?;

    if !granted.iter().any(|p| p == permission) {
        return Err(AuthError::PermissionDenied(permission.to_string()));
    }

    Ok(())
}
