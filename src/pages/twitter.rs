use super::{required, Page, PageResult};
use crate::client::{endpoints, ApiClient};
use crate::fetch::TwitterFetcher;
use crate::models::{Envelope, MonitoredAccount};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub type TwitterMonitorPage = Page<TwitterFetcher>;

impl Page<TwitterFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), TwitterFetcher::new(client), interval)
    }

    /// Start following `username`. A leading `@` is ignored.
    pub async fn add_account(&self, username: &str) -> PageResult<Option<MonitoredAccount>> {
        let username = required("username", username.trim().trim_start_matches('@'))?;
        let result = self
            .client()
            .post::<_, Option<Envelope<MonitoredAccount>>>(
                endpoints::TWITTER_ACCOUNTS,
                &json!({ "username": username }),
            )
            .await
            .map(|created| created.map(|env| env.data));
        self.settle("add_account", result).await
    }

    pub async fn set_account_active(&self, id: &str, active: bool) -> PageResult<()> {
        let id = required("account id", id)?;
        let result = self
            .client()
            .patch::<_, Value>(
                &endpoints::twitter_account(&id),
                &json!({ "is_active": active }),
            )
            .await
            .map(|_| ());
        self.settle("set_account_active", result).await
    }

    pub async fn remove_account(&self, id: &str) -> PageResult<()> {
        let id = required("account id", id)?;
        let result = self.client().delete(&endpoints::twitter_account(&id)).await;
        self.settle("remove_account", result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageError;
    use crate::session::MemorySessionStore;
    use crate::testing::MockApi;

    async fn page(mock: &MockApi) -> TwitterMonitorPage {
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        TwitterMonitorPage::new(Arc::new(mock.client(store)), Duration::from_secs(60))
    }

    fn usernames(page: &TwitterMonitorPage) -> Vec<String> {
        page.latest()
            .unwrap()
            .data
            .accounts
            .iter()
            .map(|a| a.username.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_add_then_present() {
        let mock = MockApi::start().await;
        let page = page(&mock).await;
        page.load().await;

        let created = page.add_account("@justinsuntron").await.unwrap();
        assert_eq!(created.unwrap().username, "justinsuntron");

        assert!(usernames(&page).contains(&"justinsuntron".to_string()));
        assert_eq!(mock.hits("GET /twitter/accounts"), 2);
    }

    #[tokio::test]
    async fn test_remove_then_absent() {
        let mock = MockApi::start().await;
        let page = page(&mock).await;

        page.remove_account("2").await.unwrap();

        assert_eq!(usernames(&page), vec!["elonmusk".to_string()]);
        assert_eq!(mock.account_usernames(), vec!["elonmusk".to_string()]);
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let mock = MockApi::start().await;
        let page = page(&mock).await;

        page.set_account_active("2", true).await.unwrap();

        let accounts = page.latest().unwrap().data.accounts;
        assert!(accounts.iter().all(|a| a.is_active));
    }

    #[tokio::test]
    async fn test_blank_username_never_sent() {
        let mock = MockApi::start().await;
        let page = page(&mock).await;

        let err = page.add_account("  @ ").await.unwrap_err();
        assert!(matches!(err, PageError::Validation(_)));
        assert_eq!(mock.hits("POST /twitter/accounts"), 0);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_list() {
        let mock = MockApi::start().await;
        let page = page(&mock).await;
        page.load().await;
        let before = page.latest().unwrap();

        let err = page.remove_account("999").await.unwrap_err();
        assert!(matches!(err, PageError::Http(ref e) if e.status() == Some(404)));

        assert_eq!(page.latest().unwrap().data, before.data);
        assert_eq!(mock.hits("GET /twitter/accounts"), 1);
    }
}
