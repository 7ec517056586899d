//! HTTP surface for TradingView alerts.
//!
//! ## Endpoints
//!
//! - `POST /webhook`: run one trading signal against MEXC
//! - `GET /status`: credential flags and exchange reachability
//! - `POST /test`: signed account-info round trip
//! - `GET /`: service descriptor

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use common::Settings;
use common::models::{SignalError, TradeSignal};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::error::WebhookError;
use crate::services::execution_service::ExecutionService;
use crate::services::trader_slot::TraderSlot;

pub struct AppState {
    pub api_key_configured: bool,
    pub secret_key_configured: bool,
    pub trader: TraderSlot,
}

impl AppState {
    pub fn new(settings: &Settings, trader: TraderSlot) -> Self {
        Self {
            api_key_configured: settings.api_key_configured(),
            secret_key_configured: settings.secret_key_configured(),
            trader,
        }
    }
}

/// Alert body. Everything but `action` is optional. Text fields are kept as
/// raw JSON so a non-string value is a rejected signal, not a parse failure.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    action: Option<Value>,
    symbol: Option<Value>,
    quantity: Option<f64>,
}

impl WebhookPayload {
    fn into_signal(self) -> Result<TradeSignal, SignalError> {
        let action = match self.action {
            Some(Value::String(action)) => action,
            Some(other) => return Err(SignalError::UnknownAction(other.to_string())),
            None => String::new(),
        };
        let symbol = match self.symbol {
            Some(Value::String(symbol)) => Some(symbol),
            Some(other) => return Err(SignalError::InvalidSymbol(other.to_string())),
            None => None,
        };

        TradeSignal::parse(&action, symbol.as_deref(), self.quantity)
    }
}

#[derive(Debug, Serialize)]
struct WebhookResponse {
    status: &'static str,
    message: String,
    mexc_response: Value,
}

pub fn webhook_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/webhook", post(webhook_handler))
        .route("/status", get(status_handler))
        .route("/test", post(test_handler))
        .with_state(state)
}

async fn home_handler() -> Json<Value> {
    Json(json!({
        "status": "TradingView MEXC Bot Running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "webhook": "/webhook",
            "status": "/status",
            "test": "/test",
        }
    }))
}

/// The body is parsed from raw bytes: TradingView posts alerts as
/// `text/plain` even when the message is JSON.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let payload: WebhookPayload = serde_json::from_slice(&body)?;
    info!("Received webhook: {:?}", payload);

    let signal = payload.into_signal()?;

    let trader = state.trader.get().await?;
    let execution = ExecutionService::new(trader).execute(&signal).await?;

    Ok(Json(WebhookResponse {
        status: "success",
        message: execution.message,
        mexc_response: execution.response,
    }))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let trader = match state.trader.get().await {
        Ok(trader) => trader,
        Err(_) => {
            return Json(json!({
                "status": "error",
                "message": "Trader not initialized",
                "api_key_configured": state.api_key_configured,
                "secret_key_configured": state.secret_key_configured,
            }));
        }
    };

    let mexc_connected = trader.get_account_info().await.is_ok();

    Json(json!({
        "status": "running",
        "mexc_connected": mexc_connected,
        "timestamp": Utc::now().timestamp(),
        "api_key_configured": state.api_key_configured,
        "secret_key_configured": state.secret_key_configured,
    }))
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn test_handler(State(state): State<Arc<AppState>>) -> Result<Response, WebhookError> {
    let trader = state.trader.get().await?;

    let response = match trader.get_account_info().await {
        Ok(account_info) => Json(json!({
            "status": "success",
            "message": "MEXC connection successful",
            "account_info": account_info,
        }))
        .into_response(),
        Err(e) => {
            error!("MEXC connection test failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "MEXC connection failed" })),
            )
                .into_response()
        }
    };

    Ok(response)
}

pub async fn run_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = webhook_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
