use async_trait::async_trait;
use common::models::{OrderSide, OrderType};
use exchange::{ExchangeApi, ExchangeError};
use mockall::mock;
use serde_json::Value;

mock! {
    pub Exchange {}

    #[async_trait]
    impl ExchangeApi for Exchange {
        async fn place_order(
            &self,
            symbol: &str,
            side: OrderSide,
            quote_amount: f64,
            order_type: OrderType,
        ) -> Result<Value, ExchangeError>;

        async fn get_account_info(&self) -> Result<Value, ExchangeError>;

        async fn cancel_all_orders(&self, symbol: &str) -> Result<Value, ExchangeError>;
    }
}

/// A 400 from the exchange, as MEXC sends it.
pub fn rejected(endpoint: &str) -> ExchangeError {
    ExchangeError::from_status(
        axum::http::Method::POST,
        endpoint,
        400,
        r#"{"code":30004,"msg":"Insufficient position"}"#,
    )
}
