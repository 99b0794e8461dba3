use serde::Deserialize;
use serde_json::Value;
use std::{env, fs, path::Path, path::PathBuf};

use crate::auth::AuthConfig;
use crate::db::DatabaseConfig;

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Settings for the `serve` command.
///
/// Read from an optional JSON file; every section and field may be omitted.
///
/// ```json
/// {
///   "bind": "0.0.0.0:5000",
///   "database": { "url": "ws://localhost:8000" },
///   "auth": { "domain": "tenant.eu.auth0.com", "audience": "coffee_shop" }
/// }
/// ```
///
/// String values may reference environment variables as `${NAME}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Locate the config file: `COFFEE_SHOP_CONFIG`, then
/// `$XDG_CONFIG_HOME/coffee-shop/config.json`, then `./coffee-shop.json`.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("COFFEE_SHOP_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg).join("coffee-shop").join("config.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("coffee-shop.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

/// Load the config at `path`, or the located config file, or defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match resolve_config_path() {
            Some(p) => p,
            None => return Ok(AppConfig::default()),
        },
    };

    let raw = fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    let mut value: Value = serde_json::from_str(&raw)?;
    expand_value(&mut value);

    Ok(serde_json::from_value(value)?)
}

fn expand_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = expand_env_vars(s),
        Value::Array(items) => items.iter_mut().for_each(expand_value),
        Value::Object(map) => map.values_mut().for_each(expand_value),
        _ => {}
    }
}

/// Replace `${NAME}` with the value of `NAME`; unknown names are left as is.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}
