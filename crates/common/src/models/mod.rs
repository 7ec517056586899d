pub mod signal;

pub use signal::{
    DEFAULT_QUOTE_AMOUNT, DEFAULT_SYMBOL, Intent, OrderSide, OrderType, SignalError, TradeSignal,
};
