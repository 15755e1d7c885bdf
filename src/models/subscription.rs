//! Subscription, plans and billing history

use super::{deserialize_id, require_id, EntityId, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Inactive,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        };
        f.write_str(s)
    }
}

/// Current subscription. Mutated only by upgrade/cancel, then re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub status: SubscriptionStatus,
    pub plan_id: String,
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_billing_cycle")]
    pub billing_cycle: String,
    #[serde(default)]
    pub trial_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_billing_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_follows: u32,
    #[serde(default)]
    pub current_follows: u32,
    #[serde(default)]
    pub notifications_this_month: u64,
}

fn default_billing_cycle() -> String {
    "monthly".to_string()
}

impl SubscriptionState {
    /// Fraction of the follow quota in use, 0.0..=1.0
    pub fn follow_usage(&self) -> f64 {
        if self.max_follows == 0 {
            return 0.0;
        }
        (self.current_follows as f64 / self.max_follows as f64).min(1.0)
    }
}

impl Validate for SubscriptionState {
    fn validate(&self) -> Result<(), String> {
        if self.plan_id.is_empty() {
            return Err("subscription has no plan".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_billing_cycle")]
    pub billing_cycle: String,
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Validate for Plan {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)?;
        if self.price < 0.0 {
            return Err(format!("plan {} has a negative price", self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    pub order_id: String,
    #[serde(default)]
    pub plan_name: String,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub invoice_url: Option<String>,
}

impl Validate for PaymentRecord {
    fn validate(&self) -> Result<(), String> {
        require_id(&self.id)
    }
}

/// Returned by the upgrade call; the user completes payment at this URL
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeResponse {
    pub payment_url: String,
}

impl Validate for UpgradeResponse {
    fn validate(&self) -> Result<(), String> {
        if self.payment_url.is_empty() {
            return Err("upgrade returned no payment URL".to_string());
        }
        Ok(())
    }
}
