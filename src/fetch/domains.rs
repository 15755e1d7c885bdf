//! Page-level fetchers
//!
//! Composite fetchers run their leaf requests concurrently with
//! `tokio::join!`. In `load()` every leaf falls back on its own, so one
//! failing endpoint does not blank the rest of the page.

use super::{fallback, DataSource, EndpointFetcher, Fetched, ResourceFetcher};
use crate::client::{endpoints, ApiClient, HttpResult};
use crate::models::{
    Connections, HoldingsSnapshot, LinkedWallets, MonitoredAccount, MonitoredWallet,
    Notification, NotificationStats, PaymentRecord, Plan, Portfolio, SubscriptionState, Tweet,
    UserSettings, WalletTransaction,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

const DASHBOARD_LIMIT: usize = 5;
const TRANSACTION_LIMIT: usize = 50;

/// Overall provenance and combined error text of a page's leaves
fn summarize(leaves: &[(DataSource, Option<&str>)]) -> (DataSource, Option<String>) {
    let source = DataSource::combine(leaves.iter().map(|(s, _)| *s));
    let errors: Vec<&str> = leaves.iter().filter_map(|(_, e)| *e).collect();
    let error = if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    };
    (source, error)
}

fn leaf<T>(f: &Fetched<T>) -> (DataSource, Option<&str>) {
    (f.source, f.error.as_deref())
}

impl EndpointFetcher<HoldingsSnapshot> {
    pub fn holdings(client: Arc<ApiClient>) -> Self {
        Self::new(client, "holdings", endpoints::HOLDINGS, fallback::holdings)
    }
}

impl EndpointFetcher<UserSettings> {
    pub fn settings(client: Arc<ApiClient>) -> Self {
        Self::new(client, "settings", endpoints::USER_SETTINGS, fallback::settings)
    }
}

pub type HoldingsFetcher = EndpointFetcher<HoldingsSnapshot>;
pub type SettingsFetcher = EndpointFetcher<UserSettings>;

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub tweets: Vec<Tweet>,
    pub wallets: Vec<MonitoredWallet>,
    pub holdings: HoldingsSnapshot,
    pub notifications: Vec<Notification>,
    /// Per-panel provenance, in field order
    pub panels: [DataSource; 4],
}

pub struct DashboardFetcher {
    tweets: EndpointFetcher<Vec<Tweet>>,
    wallets: EndpointFetcher<Vec<MonitoredWallet>>,
    holdings: HoldingsFetcher,
    notifications: EndpointFetcher<Vec<Notification>>,
}

impl DashboardFetcher {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            tweets: EndpointFetcher::new(
                Arc::clone(&client),
                "dashboard.tweets",
                endpoints::with_limit(endpoints::TWITTER_POSTS, DASHBOARD_LIMIT),
                fallback::dashboard_tweets,
            ),
            wallets: EndpointFetcher::new(
                Arc::clone(&client),
                "dashboard.wallets",
                endpoints::WALLET_OVERVIEW,
                fallback::wallet_overview,
            ),
            holdings: EndpointFetcher::new(
                Arc::clone(&client),
                "dashboard.holdings",
                endpoints::HOLDINGS,
                fallback::holdings,
            ),
            notifications: EndpointFetcher::new(
                client,
                "dashboard.notifications",
                endpoints::with_limit(endpoints::NOTIFICATIONS, DASHBOARD_LIMIT),
                fallback::notifications,
            ),
        }
    }
}

#[async_trait]
impl ResourceFetcher for DashboardFetcher {
    type Output = DashboardData;

    fn name(&self) -> &str {
        "dashboard"
    }

    async fn fetch(&self) -> HttpResult<DashboardData> {
        let (tweets, wallets, holdings, notifications) = tokio::try_join!(
            self.tweets.fetch(),
            self.wallets.fetch(),
            self.holdings.fetch(),
            self.notifications.fetch(),
        )?;
        Ok(DashboardData {
            tweets,
            wallets,
            holdings,
            notifications,
            panels: [DataSource::Live; 4],
        })
    }

    fn fallback(&self) -> DashboardData {
        DashboardData {
            tweets: self.tweets.fallback(),
            wallets: self.wallets.fallback(),
            holdings: self.holdings.fallback(),
            notifications: self.notifications.fallback(),
            panels: [DataSource::Fallback; 4],
        }
    }

    async fn load(&self) -> Fetched<DashboardData> {
        let (tweets, wallets, holdings, notifications) = tokio::join!(
            self.tweets.load(),
            self.wallets.load(),
            self.holdings.load(),
            self.notifications.load(),
        );
        let leaves = [
            leaf(&tweets),
            leaf(&wallets),
            leaf(&holdings),
            leaf(&notifications),
        ];
        let panels = [leaves[0].0, leaves[1].0, leaves[2].0, leaves[3].0];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: DashboardData {
                tweets: tweets.data,
                wallets: wallets.data,
                holdings: holdings.data,
                notifications: notifications.data,
                panels,
            },
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

// ============================================================================
// Twitter
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterData {
    pub tweets: Vec<Tweet>,
    pub accounts: Vec<MonitoredAccount>,
}

pub struct TwitterFetcher {
    tweets: EndpointFetcher<Vec<Tweet>>,
    accounts: EndpointFetcher<Vec<MonitoredAccount>>,
}

impl TwitterFetcher {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            tweets: EndpointFetcher::new(
                Arc::clone(&client),
                "twitter.posts",
                endpoints::TWITTER_POSTS,
                fallback::tweets,
            ),
            accounts: EndpointFetcher::new(
                client,
                "twitter.accounts",
                endpoints::TWITTER_ACCOUNTS,
                fallback::accounts,
            ),
        }
    }
}

#[async_trait]
impl ResourceFetcher for TwitterFetcher {
    type Output = TwitterData;

    fn name(&self) -> &str {
        "twitter"
    }

    async fn fetch(&self) -> HttpResult<TwitterData> {
        let (tweets, accounts) = tokio::try_join!(self.tweets.fetch(), self.accounts.fetch())?;
        Ok(TwitterData { tweets, accounts })
    }

    fn fallback(&self) -> TwitterData {
        TwitterData {
            tweets: self.tweets.fallback(),
            accounts: self.accounts.fallback(),
        }
    }

    async fn load(&self) -> Fetched<TwitterData> {
        let (tweets, accounts) = tokio::join!(self.tweets.load(), self.accounts.load());
        let leaves = [leaf(&tweets), leaf(&accounts)];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: TwitterData {
                tweets: tweets.data,
                accounts: accounts.data,
            },
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

// ============================================================================
// Wallets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletData {
    pub wallets: Vec<MonitoredWallet>,
    pub transactions: Vec<WalletTransaction>,
}

pub struct WalletFetcher {
    wallets: EndpointFetcher<Vec<MonitoredWallet>>,
    transactions: EndpointFetcher<Vec<WalletTransaction>>,
}

impl WalletFetcher {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            wallets: EndpointFetcher::new(
                Arc::clone(&client),
                "wallet.list",
                endpoints::WALLET_LIST,
                fallback::wallets,
            ),
            transactions: EndpointFetcher::new(
                client,
                "wallet.transactions",
                endpoints::with_limit(endpoints::WALLET_TRANSACTIONS, TRANSACTION_LIMIT),
                fallback::transactions,
            ),
        }
    }
}

#[async_trait]
impl ResourceFetcher for WalletFetcher {
    type Output = WalletData;

    fn name(&self) -> &str {
        "wallet"
    }

    async fn fetch(&self) -> HttpResult<WalletData> {
        let (wallets, transactions) =
            tokio::try_join!(self.wallets.fetch(), self.transactions.fetch())?;
        Ok(WalletData {
            wallets,
            transactions,
        })
    }

    fn fallback(&self) -> WalletData {
        WalletData {
            wallets: self.wallets.fallback(),
            transactions: self.transactions.fallback(),
        }
    }

    async fn load(&self) -> Fetched<WalletData> {
        let (wallets, transactions) = tokio::join!(self.wallets.load(), self.transactions.load());
        let leaves = [leaf(&wallets), leaf(&transactions)];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: WalletData {
                wallets: wallets.data,
                transactions: transactions.data,
            },
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationData {
    pub notifications: Vec<Notification>,
    pub stats: NotificationStats,
}

pub struct NotificationFetcher {
    list: EndpointFetcher<Vec<Notification>>,
    stats: EndpointFetcher<NotificationStats>,
}

impl NotificationFetcher {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            list: EndpointFetcher::new(
                Arc::clone(&client),
                "notifications.list",
                endpoints::NOTIFICATION_LIST,
                fallback::notifications,
            ),
            stats: EndpointFetcher::new(
                client,
                "notifications.stats",
                endpoints::NOTIFICATION_STATS,
                fallback::notification_stats,
            ),
        }
    }

    /// The list endpoint on its own
    pub fn list(&self) -> &EndpointFetcher<Vec<Notification>> {
        &self.list
    }
}

#[async_trait]
impl ResourceFetcher for NotificationFetcher {
    type Output = NotificationData;

    fn name(&self) -> &str {
        "notifications"
    }

    async fn fetch(&self) -> HttpResult<NotificationData> {
        let (notifications, stats) = tokio::try_join!(self.list.fetch(), self.stats.fetch())?;
        Ok(NotificationData {
            notifications,
            stats,
        })
    }

    fn fallback(&self) -> NotificationData {
        NotificationData {
            notifications: self.list.fallback(),
            stats: self.stats.fallback(),
        }
    }

    async fn load(&self) -> Fetched<NotificationData> {
        let (notifications, stats) = tokio::join!(self.list.load(), self.stats.load());
        let leaves = [leaf(&notifications), leaf(&stats)];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: NotificationData {
                notifications: notifications.data,
                stats: stats.data,
            },
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

// ============================================================================
// Subscription
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionData {
    pub state: SubscriptionState,
    pub plans: Vec<Plan>,
    pub payments: Vec<PaymentRecord>,
}

pub struct SubscriptionFetcher {
    state: EndpointFetcher<SubscriptionState>,
    plans: EndpointFetcher<Vec<Plan>>,
    payments: EndpointFetcher<Vec<PaymentRecord>>,
}

impl SubscriptionFetcher {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            state: EndpointFetcher::new(
                Arc::clone(&client),
                "subscription.status",
                endpoints::SUBSCRIPTION_STATUS,
                fallback::subscription,
            ),
            plans: EndpointFetcher::new(
                Arc::clone(&client),
                "subscription.plans",
                endpoints::SUBSCRIPTION_PLANS,
                fallback::plans,
            ),
            payments: EndpointFetcher::new(
                client,
                "subscription.payments",
                endpoints::PAYMENT_HISTORY,
                fallback::payment_history,
            ),
        }
    }
}

#[async_trait]
impl ResourceFetcher for SubscriptionFetcher {
    type Output = SubscriptionData;

    fn name(&self) -> &str {
        "subscription"
    }

    async fn fetch(&self) -> HttpResult<SubscriptionData> {
        let (state, plans, payments) = tokio::try_join!(
            self.state.fetch(),
            self.plans.fetch(),
            self.payments.fetch(),
        )?;
        Ok(SubscriptionData {
            state,
            plans,
            payments,
        })
    }

    fn fallback(&self) -> SubscriptionData {
        SubscriptionData {
            state: self.state.fallback(),
            plans: self.plans.fallback(),
            payments: self.payments.fallback(),
        }
    }

    async fn load(&self) -> Fetched<SubscriptionData> {
        let (state, plans, payments) =
            tokio::join!(self.state.load(), self.plans.load(), self.payments.load());
        let leaves = [leaf(&state), leaf(&plans), leaf(&payments)];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: SubscriptionData {
                state: state.data,
                plans: plans.data,
                payments: payments.data,
            },
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

// ============================================================================
// Twitter user profile
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterProfileData {
    pub username: String,
    pub wallets: LinkedWallets,
    pub portfolio: Portfolio,
    pub connections: Connections,
}

impl TwitterProfileData {
    /// Put the requested username on sections that came back without one
    fn stamped(mut self) -> Self {
        for name in [
            &mut self.wallets.username,
            &mut self.portfolio.username,
            &mut self.connections.username,
        ] {
            if name.is_empty() {
                name.clone_from(&self.username);
            }
        }
        self
    }
}

/// Linked wallets, portfolio and connections of one Twitter user
pub struct TwitterProfileFetcher {
    username: String,
    wallets: EndpointFetcher<LinkedWallets>,
    portfolio: EndpointFetcher<Portfolio>,
    connections: EndpointFetcher<Connections>,
}

impl TwitterProfileFetcher {
    pub fn new(client: Arc<ApiClient>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            wallets: EndpointFetcher::new(
                Arc::clone(&client),
                "profile.wallets",
                endpoints::twitter_user(&username),
                fallback::linked_wallets,
            ),
            portfolio: EndpointFetcher::new(
                Arc::clone(&client),
                "profile.portfolio",
                endpoints::twitter_user_portfolio(&username),
                fallback::portfolio,
            ),
            connections: EndpointFetcher::new(
                client,
                "profile.connections",
                endpoints::twitter_user_connections(&username),
                fallback::connections,
            ),
            username,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[async_trait]
impl ResourceFetcher for TwitterProfileFetcher {
    type Output = TwitterProfileData;

    fn name(&self) -> &str {
        "twitter.profile"
    }

    async fn fetch(&self) -> HttpResult<TwitterProfileData> {
        let (wallets, portfolio, connections) = tokio::try_join!(
            self.wallets.fetch(),
            self.portfolio.fetch(),
            self.connections.fetch(),
        )?;
        Ok(TwitterProfileData {
            username: self.username.clone(),
            wallets,
            portfolio,
            connections,
        }
        .stamped())
    }

    fn fallback(&self) -> TwitterProfileData {
        TwitterProfileData {
            username: self.username.clone(),
            wallets: self.wallets.fallback(),
            portfolio: self.portfolio.fallback(),
            connections: self.connections.fallback(),
        }
        .stamped()
    }

    async fn load(&self) -> Fetched<TwitterProfileData> {
        let (wallets, portfolio, connections) = tokio::join!(
            self.wallets.load(),
            self.portfolio.load(),
            self.connections.load(),
        );
        let leaves = [leaf(&wallets), leaf(&portfolio), leaf(&connections)];
        let (source, error) = summarize(&leaves);
        Fetched {
            data: TwitterProfileData {
                username: self.username.clone(),
                wallets: wallets.data,
                portfolio: portfolio.data,
                connections: connections.data,
            }
            .stamped(),
            source,
            fetched_at: chrono::Utc::now(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::session::{MemorySessionStore, Session};
    use crate::testing::{unreachable_base_url, MockApi};

    fn live_client(mock: &MockApi) -> Arc<ApiClient> {
        Arc::new(mock.client(Arc::new(MemorySessionStore::with_session(
            mock.valid_session(),
        ))))
    }

    #[tokio::test]
    async fn test_dashboard_unreachable_uses_four_fallback_panels() {
        let config = ApiConfig {
            base_url: unreachable_base_url(),
            request_timeout_secs: 2,
        };
        let store = Arc::new(MemorySessionStore::with_session(Session::new("a", "r")));
        let client = Arc::new(ApiClient::new(&config, store).unwrap());

        let loaded = DashboardFetcher::new(client).load().await;

        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(loaded.data.panels, [DataSource::Fallback; 4]);
        assert_eq!(loaded.data.tweets, fallback::dashboard_tweets());
        assert_eq!(loaded.data.wallets, fallback::wallet_overview());
        assert_eq!(loaded.data.holdings, fallback::holdings());
        assert_eq!(loaded.data.notifications.len(), fallback::notifications().len());
        assert!(loaded.error.is_some());
    }

    #[tokio::test]
    async fn test_dashboard_live() {
        let mock = MockApi::start().await;
        let loaded = DashboardFetcher::new(live_client(&mock)).load().await;

        assert!(loaded.is_live());
        assert_eq!(loaded.data.tweets[0].id, "10");
        assert_eq!(loaded.data.holdings.btc.total_holdings, 900_000.0);
        assert_eq!(mock.hits("GET /twitter/posts"), 1);
        assert_eq!(mock.hits("GET /notifications"), 1);
    }

    #[tokio::test]
    async fn test_one_failing_panel_is_partial() {
        let mock = MockApi::start().await;
        mock.fail("/blackrock/holdings");

        let loaded = DashboardFetcher::new(live_client(&mock)).load().await;

        assert_eq!(loaded.source, DataSource::Partial);
        assert_eq!(
            loaded.data.panels,
            [
                DataSource::Live,
                DataSource::Live,
                DataSource::Fallback,
                DataSource::Live
            ]
        );
        assert_eq!(loaded.data.holdings, fallback::holdings());
        assert_eq!(loaded.data.tweets[0].id, "10");
    }

    #[tokio::test]
    async fn test_offline_twitter_falls_back() {
        let mock = MockApi::start().await;
        mock.set_offline(true);

        let loaded = TwitterFetcher::new(live_client(&mock)).load().await;
        assert!(loaded.is_fallback());
        assert_eq!(loaded.data.accounts, fallback::accounts());
        assert_eq!(loaded.data.tweets, fallback::tweets());
    }

    #[tokio::test]
    async fn test_fetch_propagates_first_failure() {
        let mock = MockApi::start().await;
        mock.fail("/wallet/list");

        let result = WalletFetcher::new(live_client(&mock)).fetch().await;
        assert_eq!(result.unwrap_err().status(), Some(500));
    }

    #[tokio::test]
    async fn test_notification_halves_fall_back_independently() {
        let mock = MockApi::start().await;
        mock.corrupt("/notifications/stats");

        let loaded = NotificationFetcher::new(live_client(&mock)).load().await;
        assert_eq!(loaded.source, DataSource::Partial);
        assert_eq!(loaded.data.notifications.len(), 3);
        assert_eq!(loaded.data.stats, fallback::notification_stats());
    }

    #[tokio::test]
    async fn test_subscription_and_settings_live() {
        let mock = MockApi::start().await;
        let client = live_client(&mock);

        let sub = SubscriptionFetcher::new(Arc::clone(&client)).load().await;
        assert!(sub.is_live());
        assert_eq!(sub.data.plans.len(), 2);
        assert!(sub.data.payments.is_empty());

        let settings = SettingsFetcher::settings(client).load().await;
        assert!(settings.is_live());
        assert_eq!(settings.data.interface.theme, "light");
        assert_eq!(settings.data.interface.refresh_interval, 30);
    }

    #[tokio::test]
    async fn test_dashboard_json_carries_panels() {
        let mock = MockApi::start().await;
        mock.fail("/wallet/overview");

        let loaded = DashboardFetcher::new(live_client(&mock)).load().await;
        let json = serde_json::to_value(&loaded).unwrap();

        assert_eq!(json["source"], "partial");
        assert_eq!(
            json["data"]["panels"],
            serde_json::json!(["live", "fallback", "live", "live"])
        );
    }

    #[tokio::test]
    async fn test_twitter_profile_live() {
        let mock = MockApi::start().await;
        let loaded = TwitterProfileFetcher::new(live_client(&mock), "vitalik")
            .load()
            .await;

        assert!(loaded.is_live());
        assert_eq!(loaded.data.wallets.username, "vitalik");
        assert_eq!(loaded.data.wallets.wallets.len(), 2);
        assert_eq!(loaded.data.portfolio.holdings[0].symbol, "ETH");
        assert_eq!(mock.hits("GET /wallet/twitter/vitalik"), 1);
        assert_eq!(mock.hits("GET /wallet/twitter/vitalik/portfolio"), 1);
        assert_eq!(mock.hits("GET /wallet/twitter/vitalik/connections"), 1);
    }

    #[tokio::test]
    async fn test_twitter_profile_sections_fall_back_alone() {
        let mock = MockApi::start().await;
        mock.fail("/wallet/twitter/vitalik/connections");

        let loaded = TwitterProfileFetcher::new(live_client(&mock), "vitalik")
            .load()
            .await;

        assert_eq!(loaded.source, DataSource::Partial);
        assert_eq!(loaded.data.wallets.wallets.len(), 2);
        assert_eq!(loaded.data.connections.username, "vitalik");
        assert_eq!(
            loaded.data.connections.connections,
            fallback::connections().connections
        );
    }

    #[tokio::test]
    async fn test_twitter_profile_unknown_user_uses_sample_for_that_user() {
        let mock = MockApi::start().await;
        let loaded = TwitterProfileFetcher::new(live_client(&mock), "nobody")
            .load()
            .await;

        assert!(loaded.is_fallback());
        assert_eq!(loaded.data.username, "nobody");
        assert_eq!(loaded.data.portfolio.username, "nobody");
        assert_eq!(loaded.data.portfolio.diversification_score, 65.2);
    }
}
