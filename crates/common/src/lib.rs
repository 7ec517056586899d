pub mod config;
pub mod logger;
pub mod models;

pub use config::{ConfigError, ExchangeSettings, Settings};
