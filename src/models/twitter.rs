//! Tracked social accounts and their posts

use super::{deserialize_id, require_id, EntityId, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post from a tracked account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub username: String,
    #[serde(alias = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: String,
    pub content: String,
    /// Translated content, when the service provides one
    #[serde(default, alias = "contentZh")]
    pub content_zh: Option<String>,
    #[serde(alias = "publishedAt")]
    pub published_at: DateTime<Utc>,
    #[serde(default, alias = "likeCount")]
    pub like_count: u64,
    #[serde(default, alias = "retweetCount")]
    pub retweet_count: u64,
    #[serde(default, alias = "replyCount")]
    pub reply_count: u64,
    #[serde(default, alias = "isVerified")]
    pub is_verified: bool,
}

impl Validate for Tweet {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.username.is_empty() {
            return Err(format!("tweet {} has no author", self.id));
        }
        Ok(())
    }
}

/// An account on the watch list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredAccount {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub username: String,
    #[serde(default, alias = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(alias = "isActive")]
    pub is_active: bool,
    #[serde(default, alias = "isVerified")]
    pub is_verified: bool,
}

impl Validate for MonitoredAccount {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.username.trim().is_empty() {
            return Err(format!("account {} has no username", self.id));
        }
        Ok(())
    }
}
