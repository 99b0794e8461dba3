use anyhow::Result;
use clap::{Parser, Subcommand};
use coffee_shop::{AppConfig, DatabaseConfig, DrinkStore, create_app, load_config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coffee-shop")]
#[command(about = "Coffee shop drink menu API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind address, e.g. 0.0.0.0:5000
        #[arg(long, env = "COFFEE_SHOP_BIND")]
        bind: Option<String>,
        #[arg(long, env = "SURREALDB_URL")]
        db_url: Option<String>,
        /// JSON config file (defaults to COFFEE_SHOP_CONFIG or ./coffee-shop.json)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Identity provider domain, e.g. tenant.eu.auth0.com
        #[arg(long, env = "COFFEE_SHOP_AUTH_DOMAIN")]
        auth_domain: Option<String>,
        /// Expected token audience
        #[arg(long, env = "COFFEE_SHOP_AUTH_AUDIENCE")]
        audience: Option<String>,
        /// JWKS endpoint (defaults to https://{domain}/.well-known/jwks.json)
        #[arg(long, env = "COFFEE_SHOP_JWKS_URL")]
        jwks_url: Option<String>,
        /// Reuse fetched signing keys for this many seconds (0 = refetch per request)
        #[arg(long)]
        jwks_cache_seconds: Option<u64>,
        /// Report the specific token verification failure instead of a generic 401
        #[arg(long, default_value_t = false)]
        fine_grained_auth_errors: bool,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
    /// Drop all drinks and insert the seed drink
    Reset {
        #[arg(long, env = "SURREALDB_URL", default_value = "memory")]
        db_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("coffee_shop=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            db_url,
            config,
            auth_domain,
            audience,
            jwks_url,
            jwks_cache_seconds,
            fine_grained_auth_errors,
        } => {
            let mut app_config = load_config(config.as_deref())?;
            apply_overrides(
                &mut app_config,
                bind,
                db_url,
                auth_domain,
                audience,
                jwks_url,
                jwks_cache_seconds,
                fine_grained_auth_errors,
            );

            info!("Using database url: {}", app_config.database.url);
            info!(
                "Verifying tokens for audience '{}' issued by {}",
                app_config.auth.audience,
                app_config.auth.issuer()
            );
            if app_config.auth.fine_grained_errors {
                info!("Fine-grained token verification errors enabled");
            }

            let app = create_app(&app_config).await?;
            let listener = tokio::net::TcpListener::bind(&app_config.bind).await?;

            info!("Server listening on http://{}", app_config.bind);
            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = coffee_shop::create_connection(db_config).await?;
            coffee_shop::ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::Reset { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Resetting drinks in {}", db_config.url);

            let db = coffee_shop::create_connection(db_config).await?;
            coffee_shop::ensure_schema(&db).await?;

            let seed = DrinkStore::new(db).reset().await?;
            println!("Menu reset. Seed drink: {} (id {})", seed.title, seed.id);
        }
    }

    Ok(())
}

/// Apply command line settings on top of the file configuration.
#[allow(clippy::too_many_arguments)]
fn apply_overrides(
    config: &mut AppConfig,
    bind: Option<String>,
    db_url: Option<String>,
    auth_domain: Option<String>,
    audience: Option<String>,
    jwks_url: Option<String>,
    jwks_cache_seconds: Option<u64>,
    fine_grained_auth_errors: bool,
) {
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(url) = db_url {
        config.database.url = url;
    }
    if let Some(domain) = auth_domain {
        config.auth.domain = domain;
    }
    if let Some(audience) = audience {
        config.auth.audience = audience;
    }
    if let Some(url) = jwks_url {
        config.auth.jwks_url = Some(url);
    }
    if let Some(seconds) = jwks_cache_seconds {
        config.auth.jwks_cache_seconds = seconds;
    }
    if fine_grained_auth_errors {
        config.auth.fine_grained_errors = true;
    }
}
