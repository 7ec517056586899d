use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use common::ExchangeSettings;
use common::models::{OrderSide, OrderType};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::credentials::Credentials;
use crate::error::ExchangeError;
use crate::remote::signer::RequestSigner;
use crate::traits::ExchangeApi;

pub const API_KEY_HEADER: &str = "X-MEXC-APIKEY";
pub const ORDER_ENDPOINT: &str = "/api/v3/order";
pub const ACCOUNT_ENDPOINT: &str = "/api/v3/account";
pub const OPEN_ORDERS_ENDPOINT: &str = "/api/v3/openOrders";

const USER_AGENT: &str = concat!("mexc-signal-relay/", env!("CARGO_PKG_VERSION"));

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Order parameters before `timestamp`/`signature` are added.
pub fn order_params(
    symbol: &str,
    side: OrderSide,
    quote_amount: f64,
    order_type: OrderType,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("symbol".to_string(), symbol.to_string()),
        ("side".to_string(), side.as_str().to_string()),
        ("type".to_string(), order_type.as_str().to_string()),
        // f64 Display drops a zero fraction: 50.0 -> "50".
        ("quoteOrderQty".to_string(), quote_amount.to_string()),
    ])
}

#[derive(Clone)]
pub struct MexcClient {
    client: Client,
    base_url: String,
    api_key: String,
    signer: RequestSigner,
    clock: fn() -> i64,
}

impl MexcClient {
    pub fn new(credentials: &Credentials, settings: &ExchangeSettings) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(settings.timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(ExchangeError::Client)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key().to_string(),
            signer: RequestSigner::new(credentials.secret_key()),
            clock: now_millis,
        })
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Signs `params` and performs a single call. GET and DELETE carry the
    /// signed set in the query string, POST in a JSON body; MEXC checks the
    /// signature against whichever transport the endpoint expects.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        params: BTreeMap<String, String>,
    ) -> Result<Value, ExchangeError> {
        let signed = self.signer.signed_request(params, (self.clock)());
        let url = format!("{}{}", self.base_url, endpoint);

        let request = self
            .client
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, &self.api_key);
        let request = if method == Method::POST {
            request.json(&signed)
        } else {
            request.query(&signed.to_pairs())
        };

        debug!(%method, endpoint, timestamp = signed.timestamp(), "MEXC request");

        // The request URL carries the signed query, so it is stripped before
        // the error can reach a log line.
        let resp = request.send().await.map_err(|source| {
            let source = source.without_url();
            error!(%method, endpoint, "MEXC request failed: {}", source);
            ExchangeError::Transport {
                method: method.clone(),
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| ExchangeError::Transport {
            method: method.clone(),
            endpoint: endpoint.to_string(),
            source: source.without_url(),
        })?;

        debug!(%method, endpoint, status = status.as_u16(), "MEXC response");

        if !status.is_success() {
            let err = ExchangeError::from_status(method, endpoint, status.as_u16(), &body);
            error!("MEXC API Error: {}", err);
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|source| {
            error!(%method, endpoint, "MEXC returned a non-JSON body");
            ExchangeError::Decode {
                method,
                endpoint: endpoint.to_string(),
                source,
            }
        })
    }
}

#[async_trait]
impl ExchangeApi for MexcClient {
    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quote_amount: f64,
        order_type: OrderType,
    ) -> Result<Value, ExchangeError> {
        info!("Placing Order: {} {} {} USDT {}", side, order_type, quote_amount, symbol);
        let params = order_params(symbol, side, quote_amount, order_type);
        self.send(Method::POST, ORDER_ENDPOINT, params).await
    }

    async fn get_account_info(&self) -> Result<Value, ExchangeError> {
        self.send(Method::GET, ACCOUNT_ENDPOINT, BTreeMap::new()).await
    }

    async fn cancel_all_orders(&self, symbol: &str) -> Result<Value, ExchangeError> {
        info!("Cancelling open orders: {}", symbol);
        let params = BTreeMap::from([("symbol".to_string(), symbol.to_string())]);
        self.send(Method::DELETE, OPEN_ORDERS_ENDPOINT, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    const TS: i64 = 1_700_000_000_000;

    fn fixed_clock() -> i64 {
        TS
    }

    fn client_for(server: &MockServer) -> MexcClient {
        let settings = ExchangeSettings {
            base_url: server.base_url(),
            timeout: Duration::from_secs(5),
        };
        MexcClient::new(&Credentials::new("test-key", "test-secret"), &settings)
            .unwrap()
            .with_clock(fixed_clock)
    }

    #[test]
    fn test_order_params_are_exact() {
        let params = order_params("BTCUSDT", OrderSide::Buy, 50.0, OrderType::Market);

        let expected = BTreeMap::from([
            ("symbol".to_string(), "BTCUSDT".to_string()),
            ("side".to_string(), "BUY".to_string()),
            ("type".to_string(), "MARKET".to_string()),
            ("quoteOrderQty".to_string(), "50".to_string()),
        ]);
        assert_eq!(params, expected);
    }

    #[test]
    fn test_fractional_quote_amount() {
        let params = order_params("ETHUSDT", OrderSide::Sell, 12.75, OrderType::Market);
        assert_eq!(params["quoteOrderQty"], "12.75");
        assert_eq!(params["side"], "SELL");
    }

    #[tokio::test]
    async fn test_place_order_posts_signed_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v3/order")
                    .header("x-mexc-apikey", "test-key")
                    .header("content-type", "application/json")
                    .body_includes(r#""symbol":"BTCUSDT""#)
                    .body_includes(r#""quoteOrderQty":"50""#)
                    .body_includes(r#""timestamp":"1700000000000""#)
                    .body_includes(
                        r#""signature":"70655d194cfb6bcb29b49f6518cc5cf34c3168e4ba9cd694770e7e0280b6bb7a""#,
                    );
                then.status(200)
                    .json_body(json!({"symbol": "BTCUSDT", "orderId": "C02__1", "side": "BUY"}));
            })
            .await;

        let resp = client_for(&server)
            .place_order("BTCUSDT", OrderSide::Buy, 50.0, OrderType::Market)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp["orderId"], "C02__1");
    }

    #[tokio::test]
    async fn test_account_info_is_signed_get_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v3/account")
                    .header("x-mexc-apikey", "test-key")
                    .query_param("timestamp", "1700000000000")
                    .query_param(
                        "signature",
                        "dccf2651b1d8329665bfddb0798eccd4650d986a9cfe5547b2f5822131e7620b",
                    );
                then.status(200).json_body(json!({"canTrade": true, "balances": []}));
            })
            .await;

        let resp = client_for(&server).get_account_info().await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp["canTrade"], true);
    }

    #[tokio::test]
    async fn test_cancel_all_orders_is_signed_delete_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/api/v3/openOrders")
                    .header("x-mexc-apikey", "test-key")
                    .query_param("symbol", "ETHUSDT")
                    .query_param("timestamp", "1700000000000")
                    .query_param(
                        "signature",
                        "a5f3946abc5646c9094a41ca8ae18afffa14e81526fca7c6b86730df485c353e",
                    );
                then.status(200).json_body(json!([]));
            })
            .await;

        let resp = client_for(&server).cancel_all_orders("ETHUSDT").await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp, json!([]));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v3/order");
                then.status(400)
                    .json_body(json!({"code": 700002, "msg": "Signature for this request is not valid."}));
            })
            .await;

        let err = client_for(&server)
            .place_order("BTCUSDT", OrderSide::Buy, 50.0, OrderType::Market)
            .await
            .unwrap_err();

        match err {
            ExchangeError::Status { status, code, .. } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(700002));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v3/account");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let err = client_for(&server).get_account_info().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        let settings = ExchangeSettings {
            // Reserved port, nothing listens there.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
        };
        let client = MexcClient::new(&Credentials::new("k", "s"), &settings).unwrap();

        let err = client.get_account_info().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Transport { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_transport_errors_do_not_leak_the_signature() {
        let settings = ExchangeSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
        };
        let client = MexcClient::new(&Credentials::new("k", "s"), &settings)
            .unwrap()
            .with_clock(fixed_clock);

        let err = client.cancel_all_orders("ETHUSDT").await.unwrap_err();
        let display = err.to_string();
        let debug = format!("{err:?}");

        assert!(matches!(err, ExchangeError::Transport { .. }), "{debug}");
        assert!(display.contains("/api/v3/openOrders"), "{display}");
        for rendered in [&display, &debug] {
            assert!(!rendered.contains("signature="), "{rendered}");
            assert!(!rendered.contains("timestamp="), "{rendered}");
        }
    }
}
