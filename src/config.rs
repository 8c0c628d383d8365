use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Without a URI the service keeps everything in memory.
    pub mongodb_uri: Option<String>,
    pub database: String,
    pub bind: String,
    pub port: u16,
    pub cleanup_interval_secs: u64,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Config {
            mongodb_uri: lookup("MONGODB_URI").filter(|uri| !uri.is_empty()),
            database: lookup("TRIPSPLIT_DATABASE").unwrap_or_else(|| "TripSplit".to_string()),
            bind: lookup("TRIPSPLIT_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 8080)?,
            cleanup_interval_secs: parse(&lookup, "TRIPSPLIT_CLEANUP_SECS", 3600)?,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "tripsplit=info".to_string()),
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
