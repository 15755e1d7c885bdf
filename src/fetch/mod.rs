//! Resource Fetchers
//!
//! A fetcher issues one or more API calls for a page and normalizes the
//! result. [`ResourceFetcher::load`] never fails: any error (network,
//! non-2xx, malformed payload) is logged and replaced by a fixed fallback
//! dataset, and the returned [`Fetched`] records which one the caller got.
//!
//! - **EndpointFetcher**: one enveloped GET endpoint
//! - **domains**: per-page fetchers that fan out concurrently
//! - **fallback**: the fixed datasets

pub mod domains;
pub mod fallback;

pub use domains::{
    DashboardData, DashboardFetcher, HoldingsFetcher, NotificationData, NotificationFetcher,
    SettingsFetcher, SubscriptionData, SubscriptionFetcher, TwitterData, TwitterFetcher,
    TwitterProfileData, TwitterProfileFetcher, WalletData, WalletFetcher,
};

use crate::client::{ApiClient, HttpError, HttpResult};
use crate::models::Validate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Decoded from a successful API response
    Live,
    /// Some panels are live, some are fallback
    Partial,
    /// Fixed fallback dataset
    Fallback,
}

impl DataSource {
    /// Summarize the sources of several panels
    pub fn combine<I: IntoIterator<Item = DataSource>>(sources: I) -> DataSource {
        let mut any_live = false;
        let mut any_fallback = false;
        for source in sources {
            match source {
                DataSource::Live => any_live = true,
                DataSource::Fallback => any_fallback = true,
                DataSource::Partial => {
                    any_live = true;
                    any_fallback = true;
                }
            }
        }
        match (any_live, any_fallback) {
            (_, false) => DataSource::Live,
            (false, true) => DataSource::Fallback,
            (true, true) => DataSource::Partial,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSource::Live => "live",
            DataSource::Partial => "partial",
            DataSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// A loaded value plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
    /// Why the fallback was used
    pub error: Option<String>,
}

impl<T> Fetched<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
            fetched_at: Utc::now(),
            error: None,
        }
    }

    pub fn fallback(data: T, error: &HttpError) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
            fetched_at: Utc::now(),
            error: Some(error.to_string()),
        }
    }

    pub fn with_source(data: T, source: DataSource) -> Self {
        Self {
            data,
            source,
            fetched_at: Utc::now(),
            error: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source == DataSource::Live
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Loads one page's worth of data
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    type Output: Clone + Send + Sync + 'static;

    /// Name used in logs
    fn name(&self) -> &str;

    /// Fetch from the API, propagating any failure
    async fn fetch(&self) -> HttpResult<Self::Output>;

    /// Fixed dataset used when the fetch fails
    fn fallback(&self) -> Self::Output;

    /// Fetch, substituting the fallback on failure
    async fn load(&self) -> Fetched<Self::Output> {
        match self.fetch().await {
            Ok(data) => Fetched::live(data),
            Err(e) => {
                tracing::warn!(fetcher = self.name(), error = %e, "Fetch failed, using fallback data");
                Fetched::fallback(self.fallback(), &e)
            }
        }
    }
}

/// Fetches a single `{"data": ...}` endpoint
pub struct EndpointFetcher<T> {
    client: Arc<ApiClient>,
    name: &'static str,
    path: String,
    fallback: fn() -> T,
}

impl<T> EndpointFetcher<T> {
    pub fn new(
        client: Arc<ApiClient>,
        name: &'static str,
        path: impl Into<String>,
        fallback: fn() -> T,
    ) -> Self {
        Self {
            client,
            name,
            path: path.into(),
            fallback,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<T> ResourceFetcher for EndpointFetcher<T>
where
    T: DeserializeOwned + Validate + Clone + Send + Sync + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self) -> HttpResult<T> {
        self.client.get_data(&self.path).await
    }

    fn fallback(&self) -> T {
        (self.fallback)()
    }
}
