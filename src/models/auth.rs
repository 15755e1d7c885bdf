//! Authentication payloads and the user record

use super::{deserialize_id, require_id, EntityId, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Trial,
    Paid,
    Lifetime,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Trial => write!(f, "trial"),
            UserType::Paid => write!(f, "paid member"),
            UserType::Lifetime => write!(f, "lifetime member"),
        }
    }
}

/// The authenticated user, fetched once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub username: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(default)]
    pub trial_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_follows: Option<u32>,
    #[serde(default)]
    pub current_follows: Option<u32>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Whole days left in the trial, rounded up and never negative.
    ///
    /// `None` for non-trial accounts or when the API sent no end date.
    pub fn trial_days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.user_type != UserType::Trial {
            return None;
        }
        let end = self.trial_end_date?;
        let millis = (end - now).num_milliseconds();
        if millis <= 0 {
            return Some(0);
        }
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        Some((millis + DAY_MS - 1) / DAY_MS)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.username.trim().is_empty() {
            return Err("user has no username".to_string());
        }
        Ok(())
    }
}

/// Access/refresh pair as returned by the refresh endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl Validate for TokenPair {
    fn validate(&self) -> Result<(), String> {
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return Err("empty token in refresh response".to_string());
        }
        Ok(())
    }
}

/// Login / OAuth callback response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl Validate for AuthResponse {
    fn validate(&self) -> Result<(), String> {
        if self.access_token.is_empty() || self.refresh_token.is_empty() {
            return Err("empty token in auth response".to_string());
        }
        match &self.user {
            Some(user) => user.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

/// Third-party identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Apple => "apple",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "apple" => Ok(OAuthProvider::Apple),
            other => Err(format!("unknown OAuth provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeUrl {
    pub authorization_url: String,
}

impl Validate for AuthorizeUrl {
    fn validate(&self) -> Result<(), String> {
        if self.authorization_url.is_empty() {
            return Err("provider returned no authorization URL".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OAuthCallback {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}
