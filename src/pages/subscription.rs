use super::{required, Page, PageResult};
use crate::client::{endpoints, validated, ApiClient};
use crate::fetch::SubscriptionFetcher;
use crate::models::UpgradeResponse;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub type SubscriptionPage = Page<SubscriptionFetcher>;

impl Page<SubscriptionFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), SubscriptionFetcher::new(client), interval)
    }

    /// Start checkout for `plan_id`; returns the payment page URL
    pub async fn upgrade(&self, plan_id: &str) -> PageResult<String> {
        let plan_id = required("plan", plan_id)?;
        let result = self
            .client()
            .post::<_, UpgradeResponse>(
                endpoints::SUBSCRIPTION_UPGRADE,
                &json!({ "plan_id": plan_id }),
            )
            .await
            .and_then(|response| validated(endpoints::SUBSCRIPTION_UPGRADE, response))
            .map(|response| response.payment_url);
        self.settle("upgrade", result).await
    }

    pub async fn cancel(&self) -> PageResult<()> {
        let result = self
            .client()
            .post::<_, Value>(endpoints::SUBSCRIPTION_CANCEL, &json!({}))
            .await
            .map(|_| ());
        self.settle("cancel", result).await
    }
}
