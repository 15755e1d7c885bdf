use super::Page;
use crate::client::ApiClient;
use crate::fetch::DashboardFetcher;
use std::sync::Arc;
use std::time::Duration;

/// Read-only overview of every monitored source
pub type DashboardPage = Page<DashboardFetcher>;

impl Page<DashboardFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), DashboardFetcher::new(client), interval)
    }
}
