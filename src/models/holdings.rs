//! Institutional holdings feed
//!
//! Read-only. A snapshot is replaced wholesale on every poll.

use super::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position in a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHoldings {
    pub total_holdings: f64,
    pub total_value_usd: f64,
    #[serde(default)]
    pub change_24h: f64,
    #[serde(default)]
    pub change_24h_amount: f64,
    #[serde(default)]
    pub value_change_24h: f64,
    #[serde(default)]
    pub change_7d: f64,
    #[serde(default)]
    pub change_7d_amount: f64,
    #[serde(default)]
    pub change_30d: f64,
    #[serde(default)]
    pub change_30d_amount: f64,
    #[serde(default)]
    pub aum: f64,
    #[serde(default)]
    pub average_cost: f64,
}

impl AssetHoldings {
    fn check(&self, asset: &str) -> Result<(), String> {
        if self.total_holdings < 0.0 || !self.total_holdings.is_finite() {
            return Err(format!("{} holdings out of range", asset));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub btc_holdings: f64,
    pub eth_holdings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsChange {
    pub asset: String,
    pub change: f64,
    #[serde(default)]
    pub value_change: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub btc: AssetHoldings,
    pub eth: AssetHoldings,
    #[serde(default)]
    pub trend_data: Vec<TrendPoint>,
    #[serde(default)]
    pub recent_changes: Vec<HoldingsChange>,
}

impl HoldingsSnapshot {
    pub fn total_value_usd(&self) -> f64 {
        self.btc.total_value_usd + self.eth.total_value_usd
    }
}

impl Validate for HoldingsSnapshot {
    fn validate(&self) -> Result<(), String> {
        self.btc.check("BTC")?;
        self.eth.check("ETH")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_asset_is_rejected() {
        let result = serde_json::from_str::<HoldingsSnapshot>(
            r#"{"btc": {"total_holdings": 1, "total_value_usd": 2}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_holdings_invalid() {
        let snapshot: HoldingsSnapshot = serde_json::from_str(
            r#"{
                "btc": {"total_holdings": -1, "total_value_usd": 0},
                "eth": {"total_holdings": 10, "total_value_usd": 30000}
            }"#,
        )
        .unwrap();
        assert!(snapshot.trend_data.is_empty());
        assert!(snapshot.validate().is_err());
    }
}
