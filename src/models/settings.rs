//! User settings and profile updates

use super::Validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub twitter_alerts: bool,
    pub wallet_alerts: bool,
    pub price_alerts: bool,
    pub system_alerts: bool,
    pub alert_frequency: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            sms_notifications: false,
            push_notifications: true,
            twitter_alerts: true,
            wallet_alerts: true,
            price_alerts: true,
            system_alerts: true,
            alert_frequency: "realtime".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub two_factor_enabled: bool,
    pub login_alerts: bool,
    pub session_timeout: String,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            login_alerts: true,
            session_timeout: "24h".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceSettings {
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub currency: String,
    pub date_format: String,
    pub auto_refresh: bool,
    /// Seconds
    pub refresh_interval: u64,
}

impl Default for InterfaceSettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            language: "zh-CN".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            currency: "USD".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
            auto_refresh: true,
            refresh_interval: 30,
        }
    }
}

/// Settings groups; any group the API omits keeps its defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub notifications: NotificationSettings,
    pub security: SecuritySettings,
    pub interface: InterfaceSettings,
}

impl Validate for UserSettings {
    fn validate(&self) -> Result<(), String> {
        if self.interface.auto_refresh && self.interface.refresh_interval == 0 {
            return Err("auto refresh enabled with a zero interval".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

/// Password change form, checked locally before anything is sent
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub const MIN_PASSWORD_LEN: usize = 6;

impl PasswordChange {
    pub fn check(&self) -> Result<(), String> {
        if self.new_password != self.confirm_password {
            return Err("new password confirmation does not match".to_string());
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "new password must be at least {} characters",
                MIN_PASSWORD_LEN
            ));
        }
        Ok(())
    }

    /// Wire body for the change-password endpoint
    pub fn to_request(&self) -> serde_json::Value {
        serde_json::json!({
            "old_password": self.current_password,
            "new_password": self.new_password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_merge_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"interface": {"theme": "light"}}"#).unwrap();
        assert_eq!(settings.interface.theme, "light");
        assert_eq!(settings.interface.refresh_interval, 30);
        assert_eq!(settings.security.session_timeout, "24h");
        assert!(settings.notifications.price_alerts);
    }

    #[test]
    fn test_password_mismatch() {
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "abcdef".into(),
            confirm_password: "abcdeg".into(),
        };
        assert!(change.check().unwrap_err().contains("does not match"));
    }

    #[test]
    fn test_password_too_short() {
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "abc".into(),
            confirm_password: "abc".into(),
        };
        assert!(change.check().unwrap_err().contains("at least 6"));
    }

    #[test]
    fn test_password_request_body() {
        let change = PasswordChange {
            current_password: "old-pass".into(),
            new_password: "new-pass".into(),
            confirm_password: "new-pass".into(),
        };
        assert!(change.check().is_ok());
        let body = change.to_request();
        assert_eq!(body["old_password"], "old-pass");
        assert!(body.get("confirm_password").is_none());
    }
}
