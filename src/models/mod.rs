//! Domain models
//!
//! Typed payloads for every entity the monitoring API returns. Responses are
//! decoded into these structs at the fetch boundary and checked with
//! [`Validate`], so nothing downstream has to guess at the shape.
//!
//! The API uses snake_case keys. A few endpoints (the dashboard wallet
//! overview in particular) answer in camelCase, so affected fields carry
//! serde aliases.

pub mod auth;
pub mod holdings;
pub mod notification;
pub mod profile;
pub mod settings;
pub mod subscription;
pub mod twitter;
pub mod wallet;

pub use auth::{
    AuthResponse, AuthorizeUrl, LoginRequest, OAuthCallback, OAuthProvider, RegisterRequest,
    TokenPair, User, UserType,
};
pub use holdings::{AssetHoldings, HoldingsChange, HoldingsSnapshot, TrendPoint};
pub use notification::{Notification, NotificationKind, NotificationStats};
pub use profile::{
    Connections, ExchangePatterns, LinkedTransfer, LinkedWallet, LinkedWallets, Portfolio,
    PortfolioHolding, WalletBalance, WalletConnection,
};
pub use settings::{
    InterfaceSettings, NotificationSettings, PasswordChange, ProfileUpdate, SecuritySettings,
    UserSettings,
};
pub use subscription::{
    PaymentRecord, Plan, SubscriptionState, SubscriptionStatus, UpgradeResponse,
};
pub use twitter::{MonitoredAccount, Tweet};
pub use wallet::{MonitoredWallet, TransactionDirection, WalletTransaction};

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a server-side entity. The API emits both strings and numbers.
pub type EntityId = String;

/// Standard `{"data": ...}` wrapper used by list and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Post-decode shape checks that serde alone cannot express
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        for (i, item) in self.iter().enumerate() {
            item.validate().map_err(|e| format!("item {}: {}", i, e))?;
        }
        Ok(())
    }
}

pub(crate) fn require_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        Err("missing id".to_string())
    } else {
        Ok(())
    }
}

/// Accept `"12"` or `12` for an id field
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Accept `"500"` or `500` for a numeric amount
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("amount out of range")),
        serde_json::Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {}", s))),
        other => Err(serde::de::Error::custom(format!(
            "expected number, got {}",
            other
        ))),
    }
}
