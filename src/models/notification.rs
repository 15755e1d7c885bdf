//! Alerts raised by the monitoring service

use super::{deserialize_id, require_id, EntityId, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Twitter,
    Wallet,
    Price,
    System,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Twitter => "twitter",
            NotificationKind::Wallet => "wallet",
            NotificationKind::Price => "price",
            NotificationKind::System => "system",
        };
        f.write_str(s)
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "twitter" => Ok(NotificationKind::Twitter),
            "wallet" => Ok(NotificationKind::Wallet),
            "price" => Ok(NotificationKind::Price),
            "system" => Ok(NotificationKind::System),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
}

impl Notification {
    /// True if created on the same UTC calendar day as `now`
    pub fn is_from_day_of(&self, now: DateTime<Utc>) -> bool {
        self.created_at.date_naive() == now.date_naive()
    }
}

impl Validate for Notification {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total: u64,
    pub today: u64,
    pub week: u64,
    pub unread: u64,
}

impl Validate for NotificationStats {
    fn validate(&self) -> Result<(), String> {
        if self.unread > self.total || self.today > self.total {
            return Err("notification stats exceed total".to_string());
        }
        Ok(())
    }
}
