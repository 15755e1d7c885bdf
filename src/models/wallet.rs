//! Monitored wallets and their transactions

use super::{deserialize_amount, deserialize_id, require_id, EntityId, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredWallet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub address: String,
    #[serde(default)]
    pub label: String,
    /// USD value of the wallet
    #[serde(default, alias = "currentValue")]
    pub current_value: f64,
    /// Percent change over the last 24 hours
    #[serde(default, alias = "change24h")]
    pub change_24h: f64,
    #[serde(alias = "isActive")]
    pub is_active: bool,
    #[serde(default, alias = "lastActivity")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// `0x742d...b4C2` style short form for tables
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

impl MonitoredWallet {
    pub fn short_address(&self) -> String {
        short_address(&self.address)
    }
}

impl Validate for MonitoredWallet {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.address.trim().is_empty() {
            return Err(format!("wallet {} has no address", self.id));
        }
        if !self.current_value.is_finite() {
            return Err(format!("wallet {} has a non-finite value", self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub direction: TransactionDirection,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub token: String,
    /// USD value at the time of the transfer
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub counterparty: String,
    pub timestamp: DateTime<Utc>,
}

impl Validate for WalletTransaction {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.token.is_empty() {
            return Err(format!("transaction {} has no token", self.id));
        }
        Ok(())
    }
}
