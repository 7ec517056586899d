use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

impl Balance {
    pub fn is_empty(&self) -> bool {
        let amount = |raw: &str| raw.parse::<f64>().unwrap_or(0.0);
        amount(&self.free) <= 0.0 && amount(&self.locked) <= 0.0
    }
}

/// The slice of `GET /api/v3/account` this service reads. The raw JSON is
/// still what gets relayed to callers.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInformation {
    #[serde(rename = "canTrade")]
    pub can_trade: bool,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl AccountInformation {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    pub fn non_zero_balances(&self) -> impl Iterator<Item = &Balance> {
        self.balances.iter().filter(|b| !b.is_empty())
    }
}
