//! HTTP routes for the drink menu.

use std::sync::Arc;

use axum::handler::Handler;
use axum::{
    Router, middleware,
    routing::{get, patch},
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::menu::DrinkStore;

pub mod drinks;
pub mod error;
pub mod guard;


pub use error::ApiError;
pub use guard::{PermissionGuard, require_permission};

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<DrinkStore>,
    verifier: Arc<TokenVerifier>,
}

impl AppContext {
    pub fn new(store: DrinkStore, verifier: TokenVerifier) -> Self {
        Self {
            store: Arc::new(store),
            verifier: Arc::new(verifier),
        }
    }

    pub fn store(&self) -> &Arc<DrinkStore> {
        &self.store
    }

    fn guard(&self, permission: &'static str) -> PermissionGuard {
        PermissionGuard::new(self.verifier.clone(), permission)
    }
}

pub fn create_router(ctx: AppContext) -> Router {
    let require = |permission: &'static str| {
        middleware::from_fn_with_state(ctx.guard(permission), require_permission)
    };

    Router::new()
        .route(
            "/drinks",
            get(drinks::list_drinks).post(drinks::create_drink.layer(require(POST_DRINKS))),
        )
        .route(
            "/drinks-detail",
            get(drinks::list_drink_details.layer(require(GET_DRINKS_DETAIL))),
        )
        .route(
            "/drinks/{id}",
            patch(drinks::update_drink.layer(require(PATCH_DRINKS)))
                .delete(drinks::delete_drink.layer(require(DELETE_DRINKS))),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(ctx)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
