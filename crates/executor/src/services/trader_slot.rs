use std::sync::Arc;

use common::Settings;
use exchange::{Credentials, ExchangeApi, MexcClient};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::InitError;

pub type TraderFactory = Box<dyn Fn() -> Result<Arc<dyn ExchangeApi>, InitError> + Send + Sync>;

/// Holds the exchange client, built on first use.
///
/// Concurrent first callers wait on a single factory run. A failed run
/// leaves the slot empty so the next request tries again.
pub struct TraderSlot {
    cell: OnceCell<Arc<dyn ExchangeApi>>,
    factory: TraderFactory,
}

impl TraderSlot {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn ExchangeApi>, InitError> + Send + Sync + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// A slot that builds a [`MexcClient`] from the loaded settings.
    pub fn from_settings(settings: Settings) -> Self {
        Self::new(move || {
            let credentials = Credentials::from_settings(&settings)?;
            let client = MexcClient::new(&credentials, &settings.exchange).map_err(InitError::Client)?;
            info!("MEXC Trader initialized");

            let trader: Arc<dyn ExchangeApi> = Arc::new(client);
            Ok(trader)
        })
    }

    pub async fn get(&self) -> Result<Arc<dyn ExchangeApi>, InitError> {
        let trader = self
            .cell
            .get_or_try_init(|| async {
                (self.factory)().inspect_err(|e| error!("MEXC trader initialization failed: {}", e))
            })
            .await?;

        Ok(Arc::clone(trader))
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock_exchange::MockExchange;
    use common::ConfigError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_slot(calls: Arc<AtomicUsize>) -> TraderSlot {
        TraderSlot::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let trader: Arc<dyn ExchangeApi> = Arc::new(MockExchange::new());
            Ok(trader)
        })
    }

    #[tokio::test]
    async fn test_builds_once_and_reuses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = counting_slot(calls.clone());
        assert!(!slot.is_initialized());

        let first = slot.get().await.unwrap();
        let second = slot.get().await.unwrap();

        assert!(slot.is_initialized());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_build_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(counting_slot(calls.clone()));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let slot = slot.clone();
                tokio::spawn(async move { slot.get().await.is_ok() })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let slot = TraderSlot::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(InitError::Config(ConfigError::MissingEnvVar("MEXC_API_KEY")))
        });

        assert!(slot.get().await.is_err());
        assert!(slot.get().await.is_err());
        assert!(!slot.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_client() {
        let settings = Settings::from_lookup(|name| match name {
            "MEXC_API_KEY" => Some("key".to_string()),
            _ => None,
        })
        .unwrap();

        let err = TraderSlot::from_settings(settings).get().await.err().unwrap();
        assert!(matches!(
            err,
            InitError::Config(ConfigError::MissingEnvVar("MEXC_SECRET_KEY"))
        ));
    }

    #[tokio::test]
    async fn test_builds_mexc_client_from_settings() {
        let settings = Settings::from_lookup(|name| match name {
            "MEXC_API_KEY" => Some("key".to_string()),
            "MEXC_SECRET_KEY" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();

        let slot = TraderSlot::from_settings(settings);
        assert!(slot.get().await.is_ok());
        assert!(slot.is_initialized());
    }
}
