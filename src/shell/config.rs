// Process configuration, read once at startup.
//
// An optional `.env` file is loaded first. Explicit environment variables win.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const HTTP_ADDR: &str = "HELPDESK_HTTP_ADDR";
pub const REQUEST_TIMEOUT_SECS: &str = "HELPDESK_REQUEST_TIMEOUT_SECS";
pub const MIN_REOPEN_CREDIT_SECS: &str = "HELPDESK_MIN_REOPEN_CREDIT_SECS";
pub const LOG: &str = "HELPDESK_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub request_timeout: Duration,
    pub min_reopen_credit_seconds: i64,
    /// Fallback tracing filter when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let http_addr = parse(&lookup, HTTP_ADDR, "a socket address", "0.0.0.0:8080".parse().ok())?;
        let timeout_secs: u64 =
            parse(&lookup, REQUEST_TIMEOUT_SECS, "a positive number of seconds", Some(5))?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: REQUEST_TIMEOUT_SECS,
                expected: "a positive number of seconds",
                value: "0".into(),
            });
        }
        let min_reopen_credit_seconds =
            parse(&lookup, MIN_REOPEN_CREDIT_SECS, "a whole number of seconds", Some(60))?;
        Ok(Self {
            http_addr,
            request_timeout: Duration::from_secs(timeout_secs),
            min_reopen_credit_seconds,
            log_filter: lookup(LOG).unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    let invalid = |value: String| ConfigError::Invalid { key, expected, value };
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| invalid(value)),
        None => default.ok_or_else(|| invalid(String::new())),
    }
}
