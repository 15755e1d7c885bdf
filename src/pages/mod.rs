//! Pages
//!
//! A [`Page`] pairs a fetcher's polling controller with the mutations the
//! page offers. Every mutation follows the same contract: validate input
//! locally, issue the call, and on success re-fetch and republish the whole
//! page. A failed call is logged and returned; the published data is left
//! as it was.

mod dashboard;
mod holdings;
mod notifications;
mod profile;
mod settings;
mod subscription;
mod twitter;
mod wallet;

pub use dashboard::DashboardPage;
pub use holdings::HoldingsPage;
pub use notifications::NotificationCenterPage;
pub use profile::TwitterProfilePage;
pub use settings::SettingsPage;
pub use subscription::SubscriptionPage;
pub use twitter::TwitterMonitorPage;
pub use wallet::{WalletMonitorPage, DEFAULT_WALLET_LABEL};

use crate::client::{ApiClient, HttpError, HttpResult};
use crate::fetch::{Fetched, ResourceFetcher};
use crate::poll::PollingController;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Refresh period for pages that are only reloaded on demand
pub const ON_DEMAND_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Http(#[from] HttpError),
}

pub type PageResult<T> = Result<T, PageError>;

/// Trimmed, non-blank input
pub(crate) fn required(field: &str, value: &str) -> PageResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PageError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

pub struct Page<F: ResourceFetcher + 'static> {
    client: Arc<ApiClient>,
    poller: PollingController<F>,
}

impl<F: ResourceFetcher + 'static> std::fmt::Debug for Page<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page").finish_non_exhaustive()
    }
}

impl<F: ResourceFetcher + 'static> Page<F> {
    pub fn with_fetcher(client: Arc<ApiClient>, fetcher: F, interval: Duration) -> Self {
        Self {
            client,
            poller: PollingController::new(fetcher, interval),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn poller(&self) -> &PollingController<F> {
        &self.poller
    }

    /// Reload now and publish
    pub async fn load(&self) -> Fetched<F::Output> {
        self.poller.refresh().await
    }

    pub fn latest(&self) -> Option<Fetched<F::Output>> {
        self.poller.latest()
    }

    /// Latest published data, loading once if nothing was published yet
    pub async fn current(&self) -> F::Output {
        match self.poller.latest() {
            Some(fetched) => fetched.data,
            None => self.load().await.data,
        }
    }

    /// Re-fetch on success; log and pass through on failure
    pub(crate) async fn settle<T>(&self, action: &str, result: HttpResult<T>) -> PageResult<T> {
        match result {
            Ok(value) => {
                tracing::info!(page = self.poller.fetcher().name(), action, "Mutation succeeded");
                self.poller.refresh().await;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(
                    page = self.poller.fetcher().name(),
                    action,
                    error = %e,
                    "Mutation failed"
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("username", "  cz  ").unwrap(), "cz");
        let err = required("username", "   ").unwrap_err();
        assert!(matches!(err, PageError::Validation(_)));
        assert_eq!(err.to_string(), "username must not be empty");
    }
}
