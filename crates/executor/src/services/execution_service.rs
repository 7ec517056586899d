use std::sync::Arc;

use common::models::{Intent, OrderSide, OrderType, TradeSignal};
use exchange::remote::AccountInformation;
use exchange::{ExchangeApi, ExchangeError};
use serde_json::Value;
use tracing::{error, info, warn};

/// Outcome of one dispatched signal.
#[derive(Debug)]
pub struct Execution {
    pub message: String,
    pub response: Value,
}

pub struct ExecutionService {
    client: Arc<dyn ExchangeApi>,
}

impl ExecutionService {
    pub fn new(client: Arc<dyn ExchangeApi>) -> Self {
        Self { client }
    }

    /// Turns a signal into exactly one exchange call.
    pub async fn execute(&self, signal: &TradeSignal) -> Result<Execution, ExchangeError> {
        let symbol = signal.symbol.as_str();
        let amount = signal.quote_amount;

        let (response, message) = match signal.intent {
            Intent::OpenLong => {
                let response = self
                    .client
                    .place_order(symbol, OrderSide::Buy, amount, OrderType::Market)
                    .await?;
                (response, format!("LONG opened: {} - {} USDT", symbol, amount))
            }
            Intent::OpenShort => {
                // Spot market: this sells base asset the account already holds.
                warn!("Spot SELL for {}: needs an existing base-asset balance", symbol);
                let response = self
                    .client
                    .place_order(symbol, OrderSide::Sell, amount, OrderType::Market)
                    .await?;
                (response, format!("SELL opened: {} - {} USDT", symbol, amount))
            }
            Intent::ClosePosition => {
                let response = self.client.cancel_all_orders(symbol).await?;
                (response, format!("Position closed: {}", symbol))
            }
        };

        info!("Trade executed: {}", message);
        Ok(Execution { message, response })
    }

    /// Logs whether the account can trade and its non-empty balances.
    pub async fn log_account_summary(&self) {
        let raw = match self.client.get_account_info().await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to fetch account info: {}", e);
                return;
            }
        };

        match AccountInformation::from_value(&raw) {
            Ok(info) => {
                info!("MEXC Account Connected. Can Trade: {}", info.can_trade);
                for b in info.non_zero_balances() {
                    info!("Balance: {} Free={} Locked={}", b.asset, b.free, b.locked);
                }
            }
            Err(e) => warn!("Unexpected account info shape: {}", e),
        }
    }
}
