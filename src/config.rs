//! Process configuration, read once from the environment (and `.env`).

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use chrono::Duration;

use crate::token::DEFAULT_TTL_MINUTES;

const DEFAULT_SECRET: &str = "your-secret-key-here";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// PostgreSQL URL; `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub secret_key: String,
    pub token_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
            database_url: None,
            db_max_connections: 5,
            secret_key: DEFAULT_SECRET.to_string(),
            token_ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(err) = dotenv::dotenv() {
            log::debug!("No .env file loaded: {}", err);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = parse("BIND_ADDR", &addr)?;
        }
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse("DB_MAX_CONNECTIONS", &max)?;
        }
        match lookup("SECRET_KEY") {
            Some(secret) if !secret.is_empty() => config.secret_key = secret,
            _ => log::warn!("SECRET_KEY is not set, signing tokens with the default key"),
        }
        if let Some(minutes) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            config.token_ttl = Duration::minutes(parse("ACCESS_TOKEN_EXPIRE_MINUTES", &minutes)?);
        }

        Ok(config)
    }
}

fn parse<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid value for {}: `{}`", key, raw))
}
