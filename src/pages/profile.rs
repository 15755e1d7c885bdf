use super::{required, Page, PageResult};
use crate::client::ApiClient;
use crate::fetch::TwitterProfileFetcher;
use std::sync::Arc;
use std::time::Duration;

pub type TwitterProfilePage = Page<TwitterProfileFetcher>;

impl Page<TwitterProfileFetcher> {
    /// Profile of `username`. A leading `@` is ignored.
    pub fn new(client: Arc<ApiClient>, username: &str, interval: Duration) -> PageResult<Self> {
        let username = required("username", username.trim().trim_start_matches('@'))?;
        let fetcher = TwitterProfileFetcher::new(Arc::clone(&client), username);
        Ok(Self::with_fetcher(client, fetcher, interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{PageError, ON_DEMAND_INTERVAL};
    use crate::session::MemorySessionStore;
    use crate::testing::MockApi;

    fn client(mock: &MockApi) -> Arc<ApiClient> {
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        Arc::new(mock.client(store))
    }

    #[tokio::test]
    async fn test_at_sign_is_stripped() {
        let mock = MockApi::start().await;
        let page = TwitterProfilePage::new(client(&mock), " @vitalik ", ON_DEMAND_INTERVAL).unwrap();
        assert_eq!(page.poller().fetcher().username(), "vitalik");

        let loaded = page.load().await;
        assert!(loaded.is_live());
        assert_eq!(loaded.data.portfolio.risk_level(), "high");
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let mock = MockApi::start().await;
        let err = TwitterProfilePage::new(client(&mock), "@", ON_DEMAND_INTERVAL).unwrap_err();
        assert!(matches!(err, PageError::Validation(_)));
    }
}
