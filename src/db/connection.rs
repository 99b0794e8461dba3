use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL")
                .unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE")
                .unwrap_or_else(|_| "coffee_shop".to_string()),
            database: env::var("SURREALDB_DATABASE")
                .unwrap_or_else(|_| "menu".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

/// Define the drink table.
///
/// Titles are indexed for lookup but deliberately not `UNIQUE`: uniqueness is
/// checked by the store before inserting.
pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        "DEFINE TABLE IF NOT EXISTS drink SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS drink_id ON TABLE drink TYPE int;
         DEFINE FIELD IF NOT EXISTS title ON TABLE drink TYPE string;
         DEFINE FIELD IF NOT EXISTS recipe ON TABLE drink TYPE string;",

        "DEFINE INDEX IF NOT EXISTS drink_title ON TABLE drink COLUMNS title;
         DEFINE INDEX IF NOT EXISTS drink_number ON TABLE drink COLUMNS drink_id;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}
