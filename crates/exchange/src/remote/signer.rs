//! HMAC-SHA256 request signing for the MEXC spot API.
//!
//! MEXC signs `k1=v1&k2=v2&...&timestamp=<ms>` with the parameters sorted by
//! key and `timestamp` always last. The signature is then sent as one more
//! parameter and never feeds its own digest.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_PARAM: &str = "timestamp";
pub const SIGNATURE_PARAM: &str = "signature";

/// The string MEXC expects to be signed. `BTreeMap` iteration gives the
/// byte-wise key order.
pub fn canonical_query(params: &BTreeMap<String, String>, timestamp: i64) -> String {
    let mut query = String::new();
    for (key, value) in params {
        query.push_str(key);
        query.push('=');
        query.push_str(value);
        query.push('&');
    }
    query.push_str(TIMESTAMP_PARAM);
    query.push('=');
    query.push_str(&timestamp.to_string());
    query
}

#[derive(Clone)]
pub struct RequestSigner {
    secret_key: SecretString,
}

impl RequestSigner {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Lowercase hex HMAC-SHA256 of [`canonical_query`].
    pub fn sign(&self, params: &BTreeMap<String, String>, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(canonical_query(params, timestamp).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn signed_request(
        &self,
        params: BTreeMap<String, String>,
        timestamp: i64,
    ) -> SignedRequest {
        let signature = self.sign(&params, timestamp);
        SignedRequest {
            params,
            timestamp,
            signature,
        }
    }
}

/// A parameter set ready for the wire: sorted params, then `timestamp`, then
/// `signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    params: BTreeMap<String, String>,
    timestamp: i64,
    signature: String,
}

impl SignedRequest {
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Ordered pairs for a query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push((TIMESTAMP_PARAM.to_string(), self.timestamp.to_string()));
        pairs.push((SIGNATURE_PARAM.to_string(), self.signature.clone()));
        pairs
    }
}

/// Serializes as a flat JSON object of strings, in wire order.
impl Serialize for SignedRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len() + 2))?;
        for (key, value) in &self.params {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(TIMESTAMP_PARAM, &self.timestamp.to_string())?;
        map.serialize_entry(SIGNATURE_PARAM, &self.signature)?;
        map.end()
    }
}
