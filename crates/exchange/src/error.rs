use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

/// Failures talking to the exchange. One variant per stage of a call.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{method} {endpoint} failed: {source}")]
    Transport {
        method: Method,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {endpoint} returned HTTP {status}: {message}")]
    Status {
        method: Method,
        endpoint: String,
        status: u16,
        /// MEXC error code from the `{"code", "msg"}` envelope, if present.
        code: Option<i64>,
        message: String,
    },

    #[error("{method} {endpoint} returned a non-JSON body: {source}")]
    Decode {
        method: Method,
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

impl ExchangeError {
    /// Classifies a non-2xx response. MEXC reports failures as
    /// `{"code": 700002, "msg": "..."}`; anything else is kept verbatim.
    pub fn from_status(method: Method, endpoint: &str, status: u16, body: &str) -> Self {
        let (code, message) = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) => (Some(err.code), err.msg),
            Err(_) => (None, body.trim().to_string()),
        };

        Self::Status {
            method,
            endpoint: endpoint.to_string(),
            status,
            code,
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
