use super::{required, Page, PageError, PageResult};
use crate::client::{endpoints, ApiClient};
use crate::fetch::SettingsFetcher;
use crate::models::{
    InterfaceSettings, NotificationSettings, PasswordChange, ProfileUpdate, SecuritySettings,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub type SettingsPage = Page<SettingsFetcher>;

impl Page<SettingsFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), SettingsFetcher::settings(client), interval)
    }

    pub async fn save_profile(&self, profile: &ProfileUpdate) -> PageResult<()> {
        let profile = ProfileUpdate {
            username: required("username", &profile.username)?,
            email: required("email", &profile.email)?,
            avatar: profile.avatar.trim().to_string(),
        };
        if !profile.email.contains('@') {
            return Err(PageError::Validation(format!(
                "{} is not an email address",
                profile.email
            )));
        }
        let result = self
            .client()
            .put::<_, Value>(endpoints::USER_PROFILE, &profile)
            .await
            .map(|_| ());
        self.settle("save_profile", result).await
    }

    pub async fn save_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> PageResult<()> {
        let result = self
            .client()
            .put::<_, Value>(endpoints::NOTIFICATION_SETTINGS, settings)
            .await
            .map(|_| ());
        self.settle("save_notification_settings", result).await
    }

    pub async fn save_security_settings(&self, settings: &SecuritySettings) -> PageResult<()> {
        let result = self
            .client()
            .put::<_, Value>(endpoints::SECURITY_SETTINGS, settings)
            .await
            .map(|_| ());
        self.settle("save_security_settings", result).await
    }

    pub async fn save_interface_settings(&self, settings: &InterfaceSettings) -> PageResult<()> {
        if settings.auto_refresh && settings.refresh_interval == 0 {
            return Err(PageError::Validation(
                "refresh interval must be positive when auto refresh is on".to_string(),
            ));
        }
        let result = self
            .client()
            .put::<_, Value>(endpoints::INTERFACE_SETTINGS, settings)
            .await
            .map(|_| ());
        self.settle("save_interface_settings", result).await
    }

    /// Delete the account. On success the session is dropped and the
    /// shell is sent to Login through the client's auth events.
    pub async fn delete_account(&self) -> PageResult<()> {
        match self.client().delete(endpoints::DELETE_ACCOUNT).await {
            Ok(()) => {
                tracing::info!("Account deleted");
                self.poller().unmount();
                self.client().expire_session();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Account deletion failed");
                Err(e.into())
            }
        }
    }

    /// Checked locally before anything is sent
    pub async fn change_password(&self, change: &PasswordChange) -> PageResult<()> {
        change.check().map_err(PageError::Validation)?;
        let result = self
            .client()
            .post::<_, Value>(endpoints::CHANGE_PASSWORD, &change.to_request())
            .await
            .map(|_| ());
        self.settle("change_password", result).await
    }
}
