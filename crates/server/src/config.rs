use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::Context;
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub supabase_url: Option<String>,
    pub seed_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            port: try_load("PORT", "3000")?,
            database_url: optional("DATABASE_URL"),
            max_connections: try_load("DATABASE_MAX_CONNECTIONS", "5")?,
            supabase_url: optional("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            seed_path: optional("SEED_PATH").map(PathBuf::from),
        })
    }

    pub fn jwks_url(&self) -> Option<String> {
        self.supabase_url
            .as_ref()
            .map(|url| format!("{url}/auth/v1/.well-known/jwks.json"))
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            warn!("{key} not set");
            None
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}
