//! Fixed datasets returned when the API cannot be reached

use crate::models::{
    AssetHoldings, Connections, ExchangePatterns, HoldingsChange, HoldingsSnapshot,
    LinkedTransfer, LinkedWallet, LinkedWallets, MonitoredAccount, MonitoredWallet, Notification,
    NotificationKind, NotificationStats, PaymentRecord, Plan, Portfolio, PortfolioHolding,
    SubscriptionState, SubscriptionStatus, TransactionDirection, TrendPoint, Tweet, UserSettings,
    WalletBalance, WalletConnection, WalletTransaction,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

const ELON_AVATAR: &str =
    "https://pbs.twimg.com/profile_images/1683325380441128960/yRsRRjGO_400x400.jpg";
const JUSTIN_AVATAR: &str =
    "https://pbs.twimg.com/profile_images/1345542479645581313/Qs_VXzOr_400x400.jpg";
const CZ_AVATAR: &str =
    "https://pbs.twimg.com/profile_images/1493096844906262529/gWJYKLuG_400x400.jpg";

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn tweet(
    id: &str,
    username: &str,
    display_name: &str,
    avatar: &str,
    content: &str,
    published_at: DateTime<Utc>,
    counts: (u64, u64, u64),
) -> Tweet {
    Tweet {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        avatar: avatar.to_string(),
        content: content.to_string(),
        content_zh: None,
        published_at,
        like_count: counts.0,
        retweet_count: counts.1,
        reply_count: counts.2,
        is_verified: true,
    }
}

pub fn tweets() -> Vec<Tweet> {
    vec![
        tweet(
            "1",
            "elonmusk",
            "Elon Musk",
            ELON_AVATAR,
            "Bitcoin is the future of finance! 🚀",
            at(2024, 1, 15, 10, 30),
            (15_200, 8_500, 3_200),
        ),
        tweet(
            "2",
            "justinsuntron",
            "Justin Sun",
            JUSTIN_AVATAR,
            "TRON ecosystem is growing stronger every day. New partnerships coming soon!",
            at(2024, 1, 15, 9, 15),
            (5_800, 2_100, 890),
        ),
        tweet(
            "3",
            "cz_binance",
            "CZ",
            CZ_AVATAR,
            "Building the future of crypto infrastructure. Stay tuned for major announcements.",
            at(2024, 1, 15, 8, 45),
            (12_400, 6_700, 2_100),
        ),
    ]
}

/// Latest posts panel on the dashboard
pub fn dashboard_tweets() -> Vec<Tweet> {
    tweets().into_iter().take(2).collect()
}

pub fn accounts() -> Vec<MonitoredAccount> {
    [
        ("1", "elonmusk", "Elon Musk", ELON_AVATAR, true),
        ("2", "justinsuntron", "Justin Sun", JUSTIN_AVATAR, true),
        ("3", "cz_binance", "CZ", CZ_AVATAR, false),
    ]
    .into_iter()
    .map(|(id, username, display_name, avatar, is_active)| MonitoredAccount {
        id: id.to_string(),
        username: username.to_string(),
        display_name: display_name.to_string(),
        avatar: avatar.to_string(),
        is_active,
        is_verified: true,
    })
    .collect()
}

pub fn wallets() -> Vec<MonitoredWallet> {
    vec![
        MonitoredWallet {
            id: "1".to_string(),
            address: "0x742d35Cc6634C0532925a3b8D4C2F2b4C2F2b4C2".to_string(),
            label: "Elon Musk wallet".to_string(),
            current_value: 2_450_000.0,
            change_24h: 12.5,
            is_active: true,
            last_activity: Some(at(2024, 1, 15, 10, 30)),
        },
        MonitoredWallet {
            id: "2".to_string(),
            address: "0x8ba1f109551bD432803012645Hac136c22C2F2b4".to_string(),
            label: "Justin Sun wallet".to_string(),
            current_value: 1_850_000.0,
            change_24h: -8.2,
            is_active: true,
            last_activity: Some(at(2024, 1, 15, 9, 15)),
        },
        MonitoredWallet {
            id: "3".to_string(),
            address: "0x9cd24553d0Cf942e0d808D5F3B89B9F5F5F5F5F5".to_string(),
            label: "CZ wallet".to_string(),
            current_value: 3_200_000.0,
            change_24h: 5.8,
            is_active: false,
            last_activity: Some(at(2024, 1, 14, 18, 45)),
        },
    ]
}

/// Wallet overview panel on the dashboard
pub fn wallet_overview() -> Vec<MonitoredWallet> {
    wallets().into_iter().filter(|w| w.is_active).collect()
}

pub fn transactions() -> Vec<WalletTransaction> {
    let tx = |id: &str, direction, amount, token: &str, value, counterparty: &str, ts| {
        WalletTransaction {
            id: id.to_string(),
            direction,
            amount,
            token: token.to_string(),
            value,
            counterparty: counterparty.to_string(),
            timestamp: ts,
        }
    };
    vec![
        tx(
            "1",
            TransactionDirection::Out,
            500.0,
            "BTC",
            21_500_000.0,
            "0x1234567890abcdef1234567890abcdef12345678",
            at(2024, 1, 15, 10, 30),
        ),
        tx(
            "2",
            TransactionDirection::In,
            1_000.0,
            "ETH",
            2_400_000.0,
            "0xabcdef1234567890abcdef1234567890abcdef12",
            at(2024, 1, 15, 9, 15),
        ),
        tx(
            "3",
            TransactionDirection::Out,
            50_000.0,
            "USDT",
            50_000.0,
            "0x567890abcdef1234567890abcdef1234567890ab",
            at(2024, 1, 15, 8, 45),
        ),
    ]
}

pub fn holdings() -> HoldingsSnapshot {
    HoldingsSnapshot {
        btc: AssetHoldings {
            total_holdings: 875_420.0,
            total_value_usd: 42_500_000_000.0,
            change_24h: 2.3,
            change_24h_amount: 19_650.0,
            value_change_24h: 950_000_000.0,
            change_7d: 5.8,
            change_7d_amount: 48_200.0,
            change_30d: 12.4,
            change_30d_amount: 96_800.0,
            aum: 42_500_000_000.0,
            average_cost: 48_500.0,
        },
        eth: AssetHoldings {
            total_holdings: 2_450_000.0,
            total_value_usd: 8_900_000_000.0,
            change_24h: 1.8,
            change_24h_amount: 43_200.0,
            value_change_24h: 156_000_000.0,
            change_7d: 4.2,
            change_7d_amount: 98_500.0,
            change_30d: 8.9,
            change_30d_amount: 200_000.0,
            aum: 8_900_000_000.0,
            average_cost: 3_630.0,
        },
        trend_data: [
            ("01-01", 820_000.0, 2_200_000.0),
            ("01-08", 835_000.0, 2_250_000.0),
            ("01-15", 850_000.0, 2_300_000.0),
            ("01-22", 865_000.0, 2_380_000.0),
            ("01-29", 875_420.0, 2_450_000.0),
        ]
        .into_iter()
        .map(|(date, btc, eth)| TrendPoint {
            date: date.to_string(),
            btc_holdings: btc,
            eth_holdings: eth,
        })
        .collect(),
        recent_changes: vec![
            HoldingsChange {
                asset: "BTC".to_string(),
                change: 19_650.0,
                value_change: 950_000_000.0,
                timestamp: at(2024, 1, 15, 10, 30),
            },
            HoldingsChange {
                asset: "ETH".to_string(),
                change: 43_200.0,
                value_change: 156_000_000.0,
                timestamp: at(2024, 1, 15, 9, 15),
            },
            HoldingsChange {
                asset: "BTC".to_string(),
                change: -8_500.0,
                value_change: -412_000_000.0,
                timestamp: at(2024, 1, 14, 14, 20),
            },
        ],
    }
}

/// Recent alerts, timestamped relative to the moment of the call
pub fn notifications() -> Vec<Notification> {
    let now = Utc::now();
    let n = |id: &str,
             kind,
             title: &str,
             content: &str,
             is_read,
             minutes_ago: i64,
             source: &str,
             action_url: Option<&str>| Notification {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        content: content.to_string(),
        is_read,
        created_at: now - Duration::minutes(minutes_ago),
        source: Some(source.to_string()),
        action_url: action_url.map(str::to_string),
    };
    vec![
        n(
            "1",
            NotificationKind::Twitter,
            "Elon Musk posted a new tweet",
            "Elon Musk just tweeted about Bitcoin: \"To the moon\"",
            false,
            5,
            "@elonmusk",
            Some("https://twitter.com/elonmusk/status/123456789"),
        ),
        n(
            "2",
            NotificationKind::Wallet,
            "Large transfer alert",
            "Monitored wallet 0x742d...35Cc sent 1,500 ETH to an unknown address",
            false,
            30,
            "Ethereum",
            Some("https://etherscan.io/tx/0x123..."),
        ),
        n(
            "3",
            NotificationKind::Price,
            "BTC price breakout",
            "Bitcoin broke $50,000, now $50,250 (+2.5%)",
            true,
            60,
            "CoinGecko",
            None,
        ),
        n(
            "4",
            NotificationKind::Twitter,
            "CZ posted an announcement",
            "Binance's CEO announced an upcoming product launch",
            true,
            120,
            "@cz_binance",
            None,
        ),
        n(
            "5",
            NotificationKind::System,
            "Scheduled maintenance",
            "The service will be upgraded tonight from 23:00 to 01:00; some features may be unavailable",
            false,
            240,
            "System",
            None,
        ),
    ]
}

pub fn notification_stats() -> NotificationStats {
    NotificationStats {
        total: 156,
        today: 12,
        week: 45,
        unread: 8,
    }
}

pub fn subscription() -> SubscriptionState {
    SubscriptionState {
        status: SubscriptionStatus::Trial,
        plan_id: "trial".to_string(),
        plan_name: "Free trial".to_string(),
        amount: 0.0,
        billing_cycle: "monthly".to_string(),
        trial_start_date: Some(at(2024, 1, 10, 0, 0)),
        trial_end_date: Some(at(2024, 1, 13, 0, 0)),
        next_billing_date: Some(at(2024, 1, 13, 0, 0)),
        max_follows: 5,
        current_follows: 3,
        notifications_this_month: 45,
    }
}

pub fn payment_history() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            id: "1".to_string(),
            order_id: "ORD-2024-001".to_string(),
            plan_name: "Pro - monthly".to_string(),
            amount: 29.99,
            status: "success".to_string(),
            created_at: at(2024, 1, 1, 0, 0),
            invoice_url: Some("https://example.com/invoice/1".to_string()),
        },
        PaymentRecord {
            id: "2".to_string(),
            order_id: "ORD-2023-012".to_string(),
            plan_name: "Basic - monthly".to_string(),
            amount: 9.99,
            status: "success".to_string(),
            created_at: at(2023, 12, 1, 0, 0),
            invoice_url: Some("https://example.com/invoice/2".to_string()),
        },
    ]
}

pub fn plans() -> Vec<Plan> {
    let plan = |id: &str, name: &str, description: &str, price, recommended, features: &[&str]| {
        Plan {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            billing_cycle: "monthly".to_string(),
            recommended,
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    };
    vec![
        plan(
            "basic",
            "Basic",
            "Core monitoring for individual users",
            9.99,
            false,
            &[
                "Monitor 10 Twitter accounts",
                "Monitor 5 wallet addresses",
                "Basic notifications",
                "Email support",
            ],
        ),
        plan(
            "pro",
            "Pro",
            "Full feature set for active traders",
            29.99,
            true,
            &[
                "Monitor 50 Twitter accounts",
                "Monitor 20 wallet addresses",
                "Advanced notifications",
                "Price alerts",
                "Advanced analytics",
                "Priority support",
            ],
        ),
        plan(
            "enterprise",
            "Enterprise",
            "Institution and team features",
            99.99,
            false,
            &[
                "Unlimited Twitter accounts",
                "Unlimited wallet addresses",
                "All advanced features",
                "API access",
                "Custom integrations",
                "24/7 dedicated support",
            ],
        ),
    ]
}

pub fn settings() -> UserSettings {
    UserSettings::default()
}

// Twitter user profile. The username is left empty; the profile fetcher
// fills in the one that was asked for.

const PROFILE_WALLET: &str = "0x742d35Cc6634C0532925a3b8D4C2F2b4C2F2b4C2";

pub fn linked_wallets() -> LinkedWallets {
    LinkedWallets {
        username: String::new(),
        wallets: vec![LinkedWallet {
            address: PROFILE_WALLET.to_string(),
            blockchain: "ethereum".to_string(),
            confidence: 0.9,
            source: "public_disclosure".to_string(),
            verified_date: Some("2024-01-15".to_string()),
            balance: WalletBalance {
                total_value_usd: 2_450_000.0,
                eth_balance: 1020.5,
            },
            recent_transactions: vec![
                LinkedTransfer {
                    direction: TransactionDirection::Out,
                    value: 5.0,
                    timestamp: at(2024, 1, 15, 10, 30),
                },
                LinkedTransfer {
                    direction: TransactionDirection::In,
                    value: 10.0,
                    timestamp: at(2024, 1, 15, 9, 15),
                },
            ],
        }],
        total_wallets: 1,
        total_value_usd: 2_450_000.0,
        last_updated: Some(at(2024, 1, 15, 12, 0)),
    }
}

fn holding(symbol: &str, name: &str, value_usd: f64, percentage: f64) -> PortfolioHolding {
    PortfolioHolding {
        symbol: symbol.to_string(),
        name: name.to_string(),
        value_usd,
        percentage,
    }
}

pub fn portfolio() -> Portfolio {
    let holdings = vec![
        holding("ETH", "Ethereum", 1_470_000.0, 60.0),
        holding("USDT", "Tether", 490_000.0, 20.0),
        holding("USDC", "USD Coin", 490_000.0, 20.0),
    ];
    Portfolio {
        username: String::new(),
        total_value_usd: 2_450_000.0,
        top_holdings: holdings.clone(),
        holdings,
        diversification_score: 65.2,
    }
}

pub fn connections() -> Connections {
    Connections {
        username: String::new(),
        connections: vec![WalletConnection {
            address1: PROFILE_WALLET.to_string(),
            address2: "0x8ba1f109551bD432803012645Hac136c22C2F2b4".to_string(),
            has_connection: true,
            direct_transactions: 3,
            total_volume: 150_000.0,
            last_interaction: Some(at(2024, 1, 14, 16, 20)),
        }],
        exchange_patterns: ExchangePatterns {
            exchange_interactions: [("Binance", 8), ("Coinbase", 5), ("Kraken", 2)]
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect(),
            most_used_exchange: Some("Binance".to_string()),
            exchange_diversity: 3,
        },
    }
}
