//! On-chain profile of a Twitter user: linked wallets, portfolio and
//! wallet-to-wallet connections

use super::wallet::{short_address, TransactionDirection};
use super::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(default)]
    pub total_value_usd: f64,
    #[serde(default)]
    pub eth_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedTransfer {
    #[serde(rename = "type")]
    pub direction: TransactionDirection,
    /// ETH
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// A wallet attributed to the user, with how sure the attribution is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedWallet {
    pub address: String,
    #[serde(default)]
    pub blockchain: String,
    /// 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub verified_date: Option<String>,
    #[serde(default, rename = "balance_data")]
    pub balance: WalletBalance,
    #[serde(default)]
    pub recent_transactions: Vec<LinkedTransfer>,
}

impl LinkedWallet {
    pub fn short_address(&self) -> String {
        short_address(&self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedWallets {
    pub username: String,
    #[serde(default)]
    pub wallets: Vec<LinkedWallet>,
    #[serde(default)]
    pub total_wallets: usize,
    #[serde(default)]
    pub total_value_usd: f64,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Validate for LinkedWallets {
    fn validate(&self) -> Result<(), String> {
        for w in &self.wallets {
            if w.address.trim().is_empty() {
                return Err("linked wallet has no address".to_string());
            }
            if !(0.0..=1.0).contains(&w.confidence) {
                return Err(format!(
                    "wallet {} confidence {} outside 0..1",
                    w.short_address(),
                    w.confidence
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHolding {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value_usd: f64,
    /// Share of the portfolio, in percent
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub username: String,
    #[serde(default)]
    pub total_value_usd: f64,
    #[serde(default)]
    pub holdings: Vec<PortfolioHolding>,
    #[serde(default)]
    pub top_holdings: Vec<PortfolioHolding>,
    /// 0 to 100; higher is more diversified
    #[serde(default)]
    pub diversification_score: f64,
}

impl Portfolio {
    /// Concentration risk as shown next to the score
    pub fn risk_level(&self) -> &'static str {
        if self.diversification_score > 70.0 {
            "low"
        } else if self.diversification_score > 40.0 {
            "medium"
        } else {
            "high"
        }
    }
}

impl Validate for Portfolio {
    fn validate(&self) -> Result<(), String> {
        if let Some(h) = self
            .holdings
            .iter()
            .chain(&self.top_holdings)
            .find(|h| h.symbol.is_empty() || !(0.0..=100.0).contains(&h.percentage))
        {
            return Err(format!("bad portfolio holding {:?}", h.symbol));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConnection {
    pub address1: String,
    pub address2: String,
    #[serde(default)]
    pub has_connection: bool,
    #[serde(default)]
    pub direct_transactions: u32,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangePatterns {
    /// Interaction count per exchange
    #[serde(default)]
    pub exchange_interactions: BTreeMap<String, u32>,
    #[serde(default)]
    pub most_used_exchange: Option<String>,
    #[serde(default)]
    pub exchange_diversity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    pub username: String,
    #[serde(default)]
    pub connections: Vec<WalletConnection>,
    #[serde(default)]
    pub exchange_patterns: ExchangePatterns,
}

impl Validate for Connections {
    fn validate(&self) -> Result<(), String> {
        match self
            .connections
            .iter()
            .find(|c| c.address1.is_empty() || c.address2.is_empty())
        {
            Some(_) => Err("connection without both addresses".to_string()),
            None => Ok(()),
        }
    }
}
