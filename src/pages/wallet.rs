use super::{required, Page, PageResult};
use crate::client::{endpoints, ApiClient};
use crate::fetch::WalletFetcher;
use crate::models::{Envelope, MonitoredWallet};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_WALLET_LABEL: &str = "Unnamed wallet";

pub type WalletMonitorPage = Page<WalletFetcher>;

impl Page<WalletFetcher> {
    pub fn new(client: Arc<ApiClient>, interval: Duration) -> Self {
        Self::with_fetcher(Arc::clone(&client), WalletFetcher::new(client), interval)
    }

    pub async fn add_wallet(
        &self,
        address: &str,
        label: Option<&str>,
    ) -> PageResult<Option<MonitoredWallet>> {
        let address = required("address", address)?;
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_WALLET_LABEL);

        let result = self
            .client()
            .post::<_, Option<Envelope<MonitoredWallet>>>(
                endpoints::WALLET_ADD,
                &json!({ "address": address, "label": label }),
            )
            .await
            .map(|created| created.map(|env| env.data));
        self.settle("add_wallet", result).await
    }

    pub async fn set_wallet_active(&self, id: &str, active: bool) -> PageResult<()> {
        let id = required("wallet id", id)?;
        let result = self
            .client()
            .patch::<_, Value>(&endpoints::wallet(&id), &json!({ "is_active": active }))
            .await
            .map(|_| ());
        self.settle("set_wallet_active", result).await
    }

    pub async fn remove_wallet(&self, id: &str) -> PageResult<()> {
        let id = required("wallet id", id)?;
        let result = self.client().delete(&endpoints::wallet(&id)).await;
        self.settle("remove_wallet", result).await
    }
}
