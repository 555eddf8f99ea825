use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8089";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection URL; required by every command that touches storage.
    pub database_url: Option<String>,
    pub bind_address: String,
    /// The single origin allowed to call the API cross-origin.
    pub cors_origin: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            max_connections: 5,
            acquire_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests don't need to
    /// mutate the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            bind_address: lookup("FEEDBACK_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            cors_origin: lookup("FEEDBACK_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            max_connections: parse_or(
                &lookup,
                "FEEDBACK_MAX_CONNECTIONS",
                defaults.max_connections,
            ),
            acquire_timeout_secs: parse_or(
                &lookup,
                "FEEDBACK_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            ),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value `{raw}`: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
