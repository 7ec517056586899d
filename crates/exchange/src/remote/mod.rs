pub mod account_response;
pub mod mexc_client;
pub mod signer;

pub use account_response::{AccountInformation, Balance};
pub use mexc_client::{MexcClient, order_params};
pub use signer::{RequestSigner, SignedRequest, canonical_query};
