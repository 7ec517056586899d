//! Signed REST access to the MEXC spot API.

pub mod credentials;
pub mod error;
pub mod remote;
pub mod traits;

pub use credentials::Credentials;
pub use error::ExchangeError;
pub use remote::{MexcClient, RequestSigner, SignedRequest};
pub use traits::ExchangeApi;
