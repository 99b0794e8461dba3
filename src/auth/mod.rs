//! Bearer token authorization.
//!
//! Access tokens are RS256 JWTs issued by an external identity provider
//! (Auth0 style). Verification follows the usual flow:
//!
//! - read the bearer token from the `Authorization` header
//! - fetch the provider's JWKS and pick the key matching the token's `kid`
//! - verify signature, audience, issuer and expiry
//! - require the route's permission in the `permissions` claim
//!
//! ## Usage
//!
//! ```ignore
//! let verifier = TokenVerifier::new(AuthConfig::default())?;
//! let token = bearer_token(headers.get("authorization").and_then(|h| h.to_str().ok()))?;
//! let claims = verifier.verify(token).await?;
//! check_permission(&claims, "post:drinks")?;
//! ```

mod error;
pub mod jwks;
mod verifier;

pub use error::{AuthError, AuthErrorBody};
pub use jwks::{DEFAULT_FETCH_TIMEOUT_SECONDS, JwksCache, JwksError};
pub use verifier::{
    AuthConfig, Claims, DEFAULT_AUDIENCE, DEFAULT_AUTH_DOMAIN, TokenVerifier, bearer_token,
    check_permission,
};
