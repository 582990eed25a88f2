// region:    --- Imports
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;
// endregion: --- Imports

// region:    --- Limits
pub const MAX_PRICE: i64 = 9999;
pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 256;
pub const MAX_CATEGORY_LEN: usize = 64;
pub const MAX_IMAGE_URL_LEN: usize = 256;
pub const MAX_COMMENT_LEN: usize = 256;
pub const MAX_USER_NAME_LEN: usize = 150;
// endregion: --- Limits

// region:    --- Config
/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub max_connections: u32,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 5,
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = parse_or(
            &lookup,
            "DB_MAX_CONNECTIONS",
            defaults.store.max_connections,
        )?;
        let retry_attempts = parse_or(
            &lookup,
            "STORE_RETRY_ATTEMPTS",
            defaults.store.retry_attempts,
        )?;
        if retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "STORE_RETRY_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }
        let backoff_ms: u64 = parse_or(&lookup, "STORE_RETRY_BACKOFF_MS", 50)?;

        Ok(Self {
            bind_addr,
            database_url,
            store: StoreConfig {
                max_connections,
                retry_attempts,
                retry_backoff: Duration::from_millis(backoff_ms),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, field: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(field) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}
// endregion: --- Config
