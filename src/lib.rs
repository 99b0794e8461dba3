// Core modules
pub mod api;
pub mod auth;
mod config;
pub mod db;
pub mod menu;

#[cfg(test)]
mod test_support;

// Re-export key types and functions
pub use api::{AppContext, create_router};
pub use auth::{AuthConfig, TokenVerifier};
pub use config::{AppConfig, DEFAULT_BIND, load_config};
pub use db::{DatabaseConfig, create_connection, ensure_schema};
pub use menu::DrinkStore;

use anyhow::Result;
use axum::Router;

/// Convenience function to create the fully wired HTTP application.
///
/// Connects to the database, makes sure the schema exists and builds the
/// router with its drink store and token verifier.
pub async fn create_app(config: &AppConfig) -> Result<Router> {
    let db = create_connection(config.database.clone()).await?;
    ensure_schema(&db).await?;

    let store = DrinkStore::new(db);
    let verifier = TokenVerifier::new(config.auth.clone())?;

    Ok(create_router(AppContext::new(store, verifier)))
}
