pub mod execution_service;
pub mod trader_slot;
pub mod webhook_service;

#[cfg(test)]
pub mod mock_exchange;
