use std::fmt;

use common::config::{API_KEY_VAR, SECRET_KEY_VAR};
use common::{ConfigError, Settings};
use secrecy::{ExposeSecret, SecretString};

/// API key pair for signed calls. The secret only ever feeds the HMAC and is
/// redacted from `Debug`.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret_key: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Fails with the name of the first missing variable.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ConfigError::MissingEnvVar(API_KEY_VAR))?;
        let secret_key = settings
            .secret_key
            .clone()
            .ok_or(ConfigError::MissingEnvVar(SECRET_KEY_VAR))?;

        Ok(Self {
            api_key,
            secret_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
