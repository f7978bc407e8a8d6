//! Client and server configuration.
//!
//! The browser build has no process environment, so client settings are
//! baked in at compile time through `option_env!`. The SSR binary reads its
//! listener settings from the process environment at start-up.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Errors produced while parsing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("invalid {key}: {value}")]
    InvalidNumber { key: &'static str, value: String },

    /// The session retry policy string is malformed.
    #[error("invalid session retry policy '{0}' (expected 'manual' or 'backoff:<attempts>:<initial_ms>:<max_ms>')")]
    InvalidRetryPolicy(String),
}

/// What the session does after validation fails with a network error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Keep the credential and wait for an explicit `revalidate`.
    #[default]
    Manual,
    /// Retry automatically with a doubling delay capped at `max_delay_ms`.
    Backoff { max_attempts: u32, initial_delay_ms: u64, max_delay_ms: u64 },
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based), or `None` once retries are exhausted.
    pub fn delay_for(self, attempt: u32) -> Option<Duration> {
        match self {
            Self::Manual => None,
            Self::Backoff { max_attempts, initial_delay_ms, max_delay_ms } => {
                if attempt >= max_attempts {
                    return None;
                }
                let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
                Some(Duration::from_millis(initial_delay_ms.saturating_mul(factor).min(max_delay_ms)))
            }
        }
    }

    /// Parse `manual` or `backoff:<attempts>:<initial_ms>:<max_ms>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetryPolicy`] for any other shape.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("manual") {
            return Ok(Self::Manual);
        }
        let invalid = || ConfigError::InvalidRetryPolicy(raw.to_owned());
        let mut parts = raw.split(':');
        if !parts.next().is_some_and(|kind| kind.eq_ignore_ascii_case("backoff")) {
            return Err(invalid());
        }
        let mut next_number = || parts.next().and_then(|v| v.trim().parse::<u64>().ok()).ok_or_else(invalid);
        let max_attempts = u32::try_from(next_number()?).map_err(|_| invalid())?;
        let initial_delay_ms = next_number()?;
        let max_delay_ms = next_number()?;
        if parts.next().is_some() || initial_delay_ms > max_delay_ms {
            return Err(invalid());
        }
        Ok(Self::Backoff { max_attempts, initial_delay_ms, max_delay_ms })
    }
}

/// Settings for the browser-side session and REST client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix prepended to every API path (empty means same origin).
    pub api_base_url: String,
    /// Durable storage key holding the bearer credential.
    pub token_key: String,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: String::new(), token_key: DEFAULT_TOKEN_KEY.to_owned(), retry: RetryPolicy::Manual }
    }
}

impl ClientConfig {
    /// Build the client config from compile-time environment variables.
    ///
    /// Optional:
    /// - `BANK_API_BASE_URL`: API origin, default same origin
    /// - `BANK_TOKEN_KEY`: storage key, default `token`
    /// - `BANK_SESSION_RETRY`: `manual` (default) or `backoff:<attempts>:<initial_ms>:<max_ms>`
    ///
    /// A malformed retry policy falls back to `manual` with a warning rather
    /// than refusing to start the UI.
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("BANK_API_BASE_URL"), option_env!("BANK_TOKEN_KEY"), option_env!("BANK_SESSION_RETRY"))
    }

    fn from_values(api_base_url: Option<&str>, token_key: Option<&str>, retry: Option<&str>) -> Self {
        let defaults = Self::default();
        let api_base_url = api_base_url.map_or(defaults.api_base_url, |v| v.trim().trim_end_matches('/').to_owned());
        let token_key = token_key
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or(defaults.token_key, str::to_owned);
        let retry = match retry.map(RetryPolicy::parse) {
            None => defaults.retry,
            Some(Ok(policy)) => policy,
            Some(Err(e)) => {
                log::warn!("{e}; using manual session retry");
                RetryPolicy::Manual
            }
        };
        Self { api_base_url, token_key, retry }
    }
}

/// Listener settings for the SSR binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Build server config from environment variables.
    ///
    /// Optional:
    /// - `HOST`: default `0.0.0.0`
    /// - `PORT`: default 3000
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] when `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned());
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber { key: "PORT", value: value.to_owned() }),
    }
}
