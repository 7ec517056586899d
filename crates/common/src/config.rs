//! Environment-driven configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Credentials are optional at this layer: the service boots without
//! them and reports the problem when a route first needs the exchange.

use std::env;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

pub const API_KEY_VAR: &str = "MEXC_API_KEY";
pub const SECRET_KEY_VAR: &str = "MEXC_SECRET_KEY";
pub const BASE_URL_VAR: &str = "MEXC_BASE_URL";
pub const TIMEOUT_VAR: &str = "MEXC_HTTP_TIMEOUT_SECS";
pub const PORT_VAR: &str = "PORT";

pub const DEFAULT_BASE_URL: &str = "https://api.mexc.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingEnvVar(&'static str),

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Transport settings for the exchange REST client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub api_key: Option<String>,
    pub secret_key: Option<SecretString>,
    pub exchange: ExchangeSettings,
}

impl Settings {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match non_empty(PORT_VAR) {
            Some(raw) => parse_var(PORT_VAR, &raw)?,
            None => DEFAULT_PORT,
        };

        let timeout_secs: u64 = match non_empty(TIMEOUT_VAR) {
            Some(raw) => parse_var(TIMEOUT_VAR, &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: TIMEOUT_VAR,
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let base_url = non_empty(BASE_URL_VAR)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            port,
            api_key: non_empty(API_KEY_VAR),
            secret_key: non_empty(SECRET_KEY_VAR).map(SecretString::from),
            exchange: ExchangeSettings {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }

    pub fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn secret_key_configured(&self) -> bool {
        self.secret_key.is_some()
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
