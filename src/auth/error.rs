//! Authorization failures.
//!
//! Each failure carries the machine-readable code and HTTP status it is
//! reported with. The response body for an [`AuthError`] is
//! `{"code": <code>, "description": <description>}`.

use std::fmt;

use http::StatusCode;
use serde::Serialize;

/// Reasons a request fails authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    HeaderMissing,
    /// The header does not start with `Bearer`.
    InvalidScheme,
    /// The header is not exactly `Bearer <token>`.
    MalformedHeader,
    /// The token header has no `kid`.
    MissingKeyId,
    /// The token's `exp` is in the past.
    TokenExpired,
    /// Audience, issuer or another registered claim did not validate.
    InvalidClaims(String),
    /// The token could not be parsed or its signature is invalid.
    InvalidToken(String),
    /// No key in the identity provider's key set matches the token's `kid`.
    KeyNotFound(String),
    /// The identity provider's key set could not be retrieved.
    JwksUnavailable(String),
    /// The verified claims carry no `permissions` entry.
    MissingPermissions,
    /// The required permission is not granted.
    PermissionDenied(String),
}

/// Wire form of an [`AuthError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthErrorBody {
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "authorization_header_missing",
            Self::InvalidScheme
            | Self::MalformedHeader
            | Self::MissingKeyId
            | Self::InvalidToken(_)
            | Self::KeyNotFound(_) => "invalid_header",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims(_) | Self::MissingPermissions => "invalid_claims",
            Self::JwksUnavailable(_) => "jwks_unavailable",
            Self::PermissionDenied(_) => "unauthorized",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::HeaderMissing
            | Self::InvalidScheme
            | Self::MalformedHeader
            | Self::MissingKeyId
            | Self::TokenExpired
            | Self::InvalidClaims(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) | Self::KeyNotFound(_) | Self::MissingPermissions => {
                StatusCode::BAD_REQUEST
            }
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::JwksUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing description. Internal detail stays in the logs.
    pub fn description(&self) -> &'static str {
        match self {
            Self::HeaderMissing => "Authorization header is MISSING!",
            Self::InvalidScheme => "Authorization header (JWT token) must start with \"Bearer\"",
            Self::MalformedHeader => "Authorization header must be a BEARER token",
            Self::MissingKeyId => "Authorization NOT correctly formatted!",
            Self::TokenExpired => "Token expired!",
            Self::InvalidClaims(_) => "Incorrect claims. Please, check the audience and issuer!",
            Self::InvalidToken(_) => "Unable to parse authentication token!",
            Self::KeyNotFound(_) => "Unable to find the appropriate key!",
            Self::JwksUnavailable(_) => "Unable to retrieve the signing keys!",
            Self::MissingPermissions => "Permission NOT included in JWT!",
            Self::PermissionDenied(_) => "Forbidden access (permission NOT found)",
        }
    }

    pub fn body(&self) -> AuthErrorBody {
        AuthErrorBody {
            code: self.code(),
            description: self.description().to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClaims(msg) => write!(f, "Invalid claims: {}", msg),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::KeyNotFound(kid) => write!(f, "No signing key matches kid '{}'", kid),
            Self::JwksUnavailable(msg) => write!(f, "JWKS unavailable: {}", msg),
            Self::PermissionDenied(permission) => {
                write!(f, "Permission '{}' not granted", permission)
            }
            other => f.write_str(other.description()),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_errors_are_unauthorized() {
        for err in [
            AuthError::HeaderMissing,
            AuthError::InvalidScheme,
            AuthError::MalformedHeader,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(AuthError::HeaderMissing.code(), "authorization_header_missing");
        assert_eq!(AuthError::InvalidScheme.code(), "invalid_header");
    }

    #[test]
    fn test_verification_error_codes() {
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(AuthError::TokenExpired.status(), StatusCode::UNAUTHORIZED);

        let claims = AuthError::InvalidClaims("aud".to_string());
        assert_eq!(claims.code(), "invalid_claims");
        assert_eq!(claims.status(), StatusCode::UNAUTHORIZED);

        let parse = AuthError::InvalidToken("bad base64".to_string());
        assert_eq!(parse.code(), "invalid_header");
        assert_eq!(parse.status(), StatusCode::BAD_REQUEST);

        let no_key = AuthError::KeyNotFound("k1".to_string());
        assert_eq!(no_key.code(), "invalid_header");
        assert_eq!(no_key.status(), StatusCode::BAD_REQUEST);

        let outage = AuthError::JwksUnavailable("connection refused".to_string());
        assert_eq!(outage.code(), "jwks_unavailable");
        assert_eq!(outage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_permission_error_codes() {
        assert_eq!(AuthError::MissingPermissions.code(), "invalid_claims");
        assert_eq!(AuthError::MissingPermissions.status(), StatusCode::BAD_REQUEST);

        let denied = AuthError::PermissionDenied("post:drinks".to_string());
        assert_eq!(denied.code(), "unauthorized");
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(denied.to_string(), "Permission 'post:drinks' not granted");
    }

    #[test]
    fn test_body_hides_internal_detail() {
        let err = AuthError::InvalidToken("InvalidSignature".to_string());
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "code": "invalid_header",
                "description": "Unable to parse authentication token!"
            })
        );
    }
}
