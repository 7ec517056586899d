use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ConfigError;
use common::models::SignalError;
use exchange::ExchangeError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Why the exchange client could not be built.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build MEXC client: {0}")]
    Client(#[source] ExchangeError),
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("MEXC trader not initialized: {0}")]
    Init(#[from] InitError),

    #[error("invalid action {0:?}")]
    InvalidAction(String),

    #[error(transparent)]
    InvalidPayload(SignalError),

    #[error("trade failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("{0}")]
    Payload(#[from] serde_json::Error),
}

impl From<SignalError> for WebhookError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::UnknownAction(action) => Self::InvalidAction(action),
            other => Self::InvalidPayload(other),
        }
    }
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAction(_) | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::Init(_) | Self::Exchange(_) | Self::Payload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text for the `{"error": ...}` envelope. Exchange details stay in the
    /// server log.
    fn public_message(&self) -> String {
        match self {
            Self::Init(_) => "MEXC trader not initialized".to_string(),
            Self::InvalidAction(_) => "Invalid action".to_string(),
            Self::InvalidPayload(err) => err.to_string(),
            Self::Exchange(_) => "Trade failed".to_string(),
            Self::Payload(err) => err.to_string(),
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match &self {
            Self::Init(_) | Self::Exchange(_) | Self::Payload(_) => error!("Webhook error: {}", self),
            Self::InvalidAction(_) | Self::InvalidPayload(_) => warn!("Webhook rejected: {}", self),
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status_code(), body).into_response()
    }
}
