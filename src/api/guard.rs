//! Permission middleware for protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::AUTHORIZATION;
use tracing::warn;

use crate::api::error::ApiError;
use crate::auth::{AuthError, TokenVerifier, bearer_token, check_permission};

/// Middleware state: the verifier plus the permission a route requires.
#[derive(Clone)]
pub struct PermissionGuard {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl PermissionGuard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }
}

/// Verify the bearer token and require the guard's permission.
///
/// Header and permission failures are answered with their structured
/// [`AuthError`] payload. Token verification failures are answered with the
/// generic 401 envelope unless fine-grained errors are enabled; the specific
/// failure is logged either way. On success the verified claims are added to
/// the request extensions.
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => Some(s),
            Err(_) => return AuthError::MalformedHeader.into_response(),
        },
        None => None,
    };

    let token = match bearer_token(header) {
        Ok(token) => token.to_string(),
        Err(e) => {
            warn!("Rejected request for '{}': {}", guard.permission, e);
            return e.into_response();
        }
    };

    let claims = match guard.verifier.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            warn!(
                code = e.code(),
                "Token verification failed for '{}': {}", guard.permission, e
            );
            if guard.verifier.fine_grained_errors() {
                return e.into_response();
            }
            return ApiError::Unauthorized.into_response();
        }
    };

    if let Err(e) = check_permission(&claims, guard.permission) {
        warn!(
            "Permission check failed for subject {}: {}",
            claims.sub.as_deref().unwrap_or("<none>"),
            e
        );
        return e.into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}
