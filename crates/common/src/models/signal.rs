use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
/// Quote-currency (USDT) notional used when a signal omits `quantity`.
pub const DEFAULT_QUOTE_AMOUNT: f64 = 10.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("invalid symbol {0:?}: expected ASCII letters and digits")]
    InvalidSymbol(String),

    #[error("invalid quantity {0}: expected a positive amount")]
    InvalidQuantity(f64),
}

/// Normalized trading action derived from a webhook's `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    OpenLong,
    /// A spot SELL. This is not a margin short: it only succeeds if the
    /// account already holds the base asset.
    OpenShort,
    ClosePosition,
}

impl FromStr for Intent {
    type Err = SignalError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "buy" | "long" => Ok(Self::OpenLong),
            "sell" | "short" => Ok(Self::OpenShort),
            "close_long" | "close_short" | "close" => Ok(Self::ClosePosition),
            other => Err(SignalError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    #[default]
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeSignal {
    pub intent: Intent,
    pub symbol: String, // "BTCUSDT"
    pub quote_amount: f64, // USDT notional
}

impl TradeSignal {
    /// Builds a signal from raw webhook fields, applying the defaults for
    /// missing `symbol` and `quantity`.
    pub fn parse(
        action: &str,
        symbol: Option<&str>,
        quantity: Option<f64>,
    ) -> Result<Self, SignalError> {
        let intent = action.parse::<Intent>()?;

        let symbol = match symbol {
            Some(raw) => normalize_symbol(raw)?,
            None => DEFAULT_SYMBOL.to_string(),
        };

        let quote_amount = quantity.unwrap_or(DEFAULT_QUOTE_AMOUNT);
        if !quote_amount.is_finite() || quote_amount <= 0.0 {
            return Err(SignalError::InvalidQuantity(quote_amount));
        }

        Ok(Self {
            intent,
            symbol,
            quote_amount,
        })
    }

    /// The order side for opening intents, `None` for closes.
    pub fn side(&self) -> Option<OrderSide> {
        match self.intent {
            Intent::OpenLong => Some(OrderSide::Buy),
            Intent::OpenShort => Some(OrderSide::Sell),
            Intent::ClosePosition => None,
        }
    }
}

fn normalize_symbol(raw: &str) -> Result<String, SignalError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SignalError::InvalidSymbol(raw.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
