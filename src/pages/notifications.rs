use super::{Page, PageError, PageResult};
use crate::client::{endpoints, ApiClient};
use crate::fetch::{NotificationFetcher, ResourceFetcher};
use crate::models::EntityId;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub type NotificationCenterPage = Page<NotificationFetcher>;

fn non_empty(ids: &[EntityId]) -> PageResult<Vec<&str>> {
    let ids: Vec<&str> = ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()).collect();
    if ids.is_empty() {
        return Err(PageError::Validation("no notifications selected".to_string()));
    }
    Ok(ids)
}

impl Page<NotificationFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), NotificationFetcher::new(client), interval)
    }

    pub async fn mark_read(&self, ids: &[EntityId]) -> PageResult<()> {
        let ids = non_empty(ids)?;
        let result = self
            .client()
            .post::<_, Value>(
                endpoints::NOTIFICATION_MARK_READ,
                &json!({ "notification_ids": ids }),
            )
            .await
            .map(|_| ());
        self.settle("mark_read", result).await
    }

    /// Mark every unread notification as read. Returns how many were sent.
    ///
    /// The unread IDs come from a fresh fetch of the list. If that fetch
    /// fails nothing is sent, so sample notifications are never posted.
    pub async fn mark_all_read(&self) -> PageResult<usize> {
        let list = match self.poller().fetcher().list().fetch().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "Notification list unavailable, not marking read");
                return Err(e.into());
            }
        };
        let unread: Vec<EntityId> = list
            .into_iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id)
            .collect();
        if unread.is_empty() {
            return Ok(0);
        }
        self.mark_read(&unread).await?;
        Ok(unread.len())
    }

    pub async fn delete(&self, ids: &[EntityId]) -> PageResult<()> {
        let ids = non_empty(ids)?;
        let result = self
            .client()
            .post::<_, Value>(
                endpoints::NOTIFICATION_DELETE,
                &json!({ "notification_ids": ids }),
            )
            .await
            .map(|_| ());
        self.settle("delete", result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::MockApi;

    fn page(mock: &MockApi) -> NotificationCenterPage {
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        NotificationCenterPage::new(Arc::new(mock.client(store)), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_mark_read_refetches() {
        let mock = MockApi::start().await;
        let page = page(&mock);

        page.mark_read(&["1".to_string()]).await.unwrap();

        let data = page.latest().unwrap().data;
        let first = data.notifications.iter().find(|n| n.id == "1").unwrap();
        assert!(first.is_read);
        assert_eq!(data.stats.unread, 1);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let mock = MockApi::start().await;
        let page = page(&mock);

        assert_eq!(page.mark_all_read().await.unwrap(), 2);
        assert_eq!(page.latest().unwrap().data.stats.unread, 0);
        assert_eq!(page.mark_all_read().await.unwrap(), 0);
        assert_eq!(mock.hits("POST /notifications/mark-read"), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_never_sends_sample_ids() {
        let mock = MockApi::start().await;
        mock.corrupt("/notifications/list");
        let page = page(&mock);

        let loaded = page.load().await;
        assert!(!loaded.is_live());
        assert!(loaded.data.notifications.iter().any(|n| !n.is_read));

        let err = page.mark_all_read().await.unwrap_err();
        assert!(matches!(err, PageError::Http(_)));
        assert_eq!(mock.hits("POST /notifications/mark-read"), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read_offline() {
        let mock = MockApi::start().await;
        let page = page(&mock);
        page.load().await;
        mock.set_offline(true);

        assert!(page.mark_all_read().await.is_err());
        assert_eq!(mock.hits("POST /notifications/mark-read"), 0);
        assert_eq!(page.latest().unwrap().data.notifications.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_then_absent() {
        let mock = MockApi::start().await;
        let page = page(&mock);

        page.delete(&["2".to_string(), "3".to_string()]).await.unwrap();

        let ids: Vec<_> = page
            .latest()
            .unwrap()
            .data
            .notifications
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_selection_rejected() {
        let mock = MockApi::start().await;
        let page = page(&mock);

        assert!(matches!(
            page.delete(&[]).await,
            Err(PageError::Validation(_))
        ));
        assert_eq!(mock.hits("POST /notifications/delete"), 0);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let mock = MockApi::start().await;
        let page = page(&mock);
        page.load().await;
        mock.fail("/notifications/delete");

        assert!(page.delete(&["1".to_string()]).await.is_err());
        assert_eq!(page.latest().unwrap().data.notifications.len(), 3);
    }
}
