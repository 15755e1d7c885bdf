//! # Vigil
//!
//! Headless client for a crypto signal-monitoring service: followed Twitter
//! accounts, watched wallets, institutional BTC/ETH holdings, notifications,
//! subscription and account settings.
//!
//! ## Features
//!
//! - **Transparent token refresh**: one refresh-and-retry per request on 401
//! - **Never-empty pages**: failed loads fall back to sample data, flagged as such
//! - **Polling**: per-page tickers with stale-result suppression
//! - **Route guard**: protected pages redirect to login without a user
//!
//! ## Modules
//!
//! - [`session`]: Token pair persistence
//! - [`client`]: HTTP client with auth refresh
//! - [`models`]: Typed, validated API payloads
//! - [`fetch`]: Page fetchers with fallback data
//! - [`poll`]: Polling controller
//! - [`pages`]: Page data plus mutations
//! - [`shell`]: Auth flows and navigation
//! - [`view`]: Derived stats and text rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil::{ApiClient, AppShell, Config, DashboardPage, FileSessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(FileSessionStore::open(config.session.path())?);
//!     let client = Arc::new(ApiClient::new(&config.api, store)?);
//!
//!     let mut shell = AppShell::new(Arc::clone(&client));
//!     shell.bootstrap().await;
//!     if !shell.is_signed_in() {
//!         shell.login("alice@example.com", "correct-horse").await?;
//!     }
//!
//!     let dashboard = DashboardPage::new(client, config.polling.dashboard());
//!     let loaded = dashboard.load().await;
//!     println!("{} tweets ({})", loaded.data.tweets.len(), loaded.source);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod pages;
pub mod poll;
pub mod session;
pub mod shell;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiClient, AuthEvent, HttpError, HttpResult};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, PollingConfig, SessionConfig};

pub use fetch::{DataSource, EndpointFetcher, Fetched, ResourceFetcher};

pub use pages::{
    DashboardPage, HoldingsPage, NotificationCenterPage, Page, PageError, PageResult,
    SettingsPage, SubscriptionPage, TwitterMonitorPage, TwitterProfilePage, WalletMonitorPage,
};

pub use poll::{PollState, PollingController};

pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};

pub use shell::{AppShell, Route, ShellError, ShellResult};
