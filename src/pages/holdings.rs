use super::Page;
use crate::client::ApiClient;
use crate::fetch::HoldingsFetcher;
use std::sync::Arc;
use std::time::Duration;

pub type HoldingsPage = Page<HoldingsFetcher>;

impl Page<HoldingsFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), HoldingsFetcher::holdings(client), interval)
    }
}
