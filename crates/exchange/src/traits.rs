use async_trait::async_trait;
use common::models::{OrderSide, OrderType};
use serde_json::Value;

use crate::error::ExchangeError;

/// The three signed spot operations the relay performs. Each makes exactly
/// one HTTP call and returns the exchange's JSON unchanged.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Market order sized in quote currency (`quoteOrderQty`).
    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quote_amount: f64,
        order_type: OrderType,
    ) -> Result<Value, ExchangeError>;

    async fn get_account_info(&self) -> Result<Value, ExchangeError>;

    /// Cancels every open order on `symbol`.
    async fn cancel_all_orders(&self, symbol: &str) -> Result<Value, ExchangeError>;
}
