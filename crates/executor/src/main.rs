use std::sync::Arc;
use tracing::{error, info};

use common::{Settings, logger};

use crate::services::execution_service::ExecutionService;
use crate::services::trader_slot::TraderSlot;
use crate::services::webhook_service::{AppState, run_server};

mod error;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    info!("System starting up...");

    let settings = Settings::from_env()?;
    let port = settings.port;

    let trader = TraderSlot::from_settings(settings.clone());
    let state = Arc::new(AppState::new(&settings, trader));

    // Eager first attempt; the routes retry lazily if this fails.
    match state.trader.get().await {
        Ok(trader) => ExecutionService::new(trader).log_account_summary().await,
        Err(e) => error!("MEXC trader not initialized at startup: {}", e),
    }

    run_server(state, port).await
}
