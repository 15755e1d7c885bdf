//! Plain-text tables for the CLI

use super::format::{format_change, format_count, format_usd, relative_time, truncate};
use super::stats::{DashboardStats, TwitterStats};
use crate::fetch::{
    DashboardData, DataSource, Fetched, NotificationData, SubscriptionData, TwitterData,
    TwitterProfileData, WalletData,
};
use crate::models::{
    HoldingsSnapshot, MonitoredAccount, MonitoredWallet, Notification, NotificationStats,
    TransactionDirection, Tweet, User, UserSettings, WalletTransaction,
};
use crate::models::wallet::short_address;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// One-line freshness banner; fallback data is always called out
pub fn source_banner<T>(fetched: &Fetched<T>) -> String {
    let at = fetched.fetched_at.format("%H:%M:%S");
    match fetched.source {
        DataSource::Live => format!("Last updated {}", at),
        DataSource::Partial => format!(
            "Last updated {} (some panels show sample data: {})",
            at,
            fetched.error.as_deref().unwrap_or("unknown error")
        ),
        DataSource::Fallback => format!(
            "Showing sample data, API unavailable ({})",
            fetched.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub fn tweets(out: &mut String, tweets: &[&Tweet], now: DateTime<Utc>) {
    if tweets.is_empty() {
        let _ = writeln!(out, "No tweets.");
        return;
    }
    let _ = writeln!(
        out,
        "{:<18} {:<10} {:>7} {:>7}  {}",
        "Account", "When", "Likes", "RTs", "Content"
    );
    let _ = writeln!(out, "{}", "-".repeat(90));
    for t in tweets {
        let _ = writeln!(
            out,
            "{:<18} {:<10} {:>7} {:>7}  {}",
            truncate(&format!("@{}", t.username), 18),
            relative_time(t.published_at, now),
            format_count(t.like_count),
            format_count(t.retweet_count),
            truncate(&t.content, 60)
        );
    }
}

pub fn accounts(out: &mut String, accounts: &[MonitoredAccount]) {
    if accounts.is_empty() {
        let _ = writeln!(out, "No followed accounts.");
        return;
    }
    let _ = writeln!(out, "{:<6} {:<20} {:<24} {}", "ID", "Username", "Name", "Status");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for a in accounts {
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:<24} {}",
            a.id,
            truncate(&format!("@{}", a.username), 20),
            truncate(&a.display_name, 24),
            if a.is_active { "active" } else { "paused" }
        );
    }
}

pub fn wallets(out: &mut String, wallets: &[MonitoredWallet]) {
    if wallets.is_empty() {
        let _ = writeln!(out, "No monitored wallets.");
        return;
    }
    let _ = writeln!(
        out,
        "{:<6} {:<16} {:<20} {:>12} {:>9} {}",
        "ID", "Address", "Label", "Value", "24h", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for w in wallets {
        let _ = writeln!(
            out,
            "{:<6} {:<16} {:<20} {:>12} {:>9} {}",
            w.id,
            w.short_address(),
            truncate(&w.label, 20),
            format_usd(w.current_value),
            format_change(w.change_24h),
            if w.is_active { "active" } else { "paused" }
        );
    }
}

pub fn transactions(out: &mut String, transactions: &[WalletTransaction], now: DateTime<Utc>) {
    if transactions.is_empty() {
        let _ = writeln!(out, "No transactions.");
        return;
    }
    let _ = writeln!(
        out,
        "{:<4} {:>14} {:<6} {:>12} {:<16} {}",
        "Dir", "Amount", "Token", "Value", "Counterparty", "When"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for tx in transactions {
        let _ = writeln!(
            out,
            "{:<4} {:>14} {:<6} {:>12} {:<16} {}",
            direction(tx.direction),
            tx.amount,
            tx.token,
            format_usd(tx.value),
            truncate(&tx.counterparty, 16),
            relative_time(tx.timestamp, now)
        );
    }
}

pub fn holdings(out: &mut String, snapshot: &HoldingsSnapshot) {
    let _ = writeln!(
        out,
        "{:<5} {:>14} {:>12} {:>9} {:>9} {:>9}",
        "Asset", "Holdings", "Value", "24h", "7d", "30d"
    );
    let _ = writeln!(out, "{}", "-".repeat(64));
    for (name, asset) in [("BTC", &snapshot.btc), ("ETH", &snapshot.eth)] {
        let _ = writeln!(
            out,
            "{:<5} {:>14} {:>12} {:>9} {:>9} {:>9}",
            name,
            format!("{:.0}", asset.total_holdings),
            format_usd(asset.total_value_usd),
            format_change(asset.change_24h),
            format_change(asset.change_7d),
            format_change(asset.change_30d)
        );
    }
    let _ = writeln!(out, "Total value: {}", format_usd(snapshot.total_value_usd()));

    if !snapshot.recent_changes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent changes:");
        for c in &snapshot.recent_changes {
            let _ = writeln!(
                out,
                "  {} {:<4} {:>+12.0} ({})",
                c.timestamp.format("%Y-%m-%d %H:%M"),
                c.asset,
                c.change,
                format_usd(c.value_change)
            );
        }
    }
}

pub fn notifications(out: &mut String, notifications: &[&Notification], now: DateTime<Utc>) {
    if notifications.is_empty() {
        let _ = writeln!(out, "No notifications.");
        return;
    }
    let _ = writeln!(
        out,
        "{:<6} {:<8} {:<2} {:<10} {}",
        "ID", "Type", "", "When", "Title"
    );
    let _ = writeln!(out, "{}", "-".repeat(70));
    for n in notifications {
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:<2} {:<10} {}",
            n.id,
            n.kind.to_string(),
            if n.is_read { "" } else { "*" },
            relative_time(n.created_at, now),
            truncate(&n.title, 48)
        );
    }
}

pub fn notification_stats(out: &mut String, stats: &NotificationStats) {
    let _ = writeln!(
        out,
        "Total: {}  Today: {}  This week: {}  Unread: {}",
        stats.total, stats.today, stats.week, stats.unread
    );
}

pub fn dashboard(data: &DashboardData, now: DateTime<Utc>) -> String {
    let stats = DashboardStats::compute(data, now);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Accounts: {}  Active wallets: {}  Today's alerts: {}  Wallet value: {}",
        stats.followed_accounts,
        stats.active_wallets,
        stats.today_notifications,
        format_usd(stats.total_wallet_value)
    );

    let titles = ["Latest tweets", "Wallets", "Institutional holdings", "Notifications"];
    for (i, title) in titles.iter().enumerate() {
        let _ = writeln!(out);
        match data.panels[i] {
            DataSource::Live => {
                let _ = writeln!(out, "== {} ==", title);
            }
            _ => {
                let _ = writeln!(out, "== {} (sample data) ==", title);
            }
        }
        match i {
            0 => tweets(&mut out, &data.tweets.iter().collect::<Vec<_>>(), now),
            1 => wallets(&mut out, &data.wallets),
            2 => holdings(&mut out, &data.holdings),
            _ => notifications(&mut out, &data.notifications.iter().collect::<Vec<_>>(), now),
        }
    }
    out
}

pub fn twitter(data: &TwitterData, shown: &[&Tweet], now: DateTime<Utc>) -> String {
    let stats = TwitterStats::compute(data, now);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Accounts: {} ({} active)  Tweets today: {}  Engagement: {}",
        stats.total_accounts,
        stats.active_accounts,
        stats.today_tweets,
        format_count(stats.total_engagement)
    );
    let _ = writeln!(out);
    accounts(&mut out, &data.accounts);
    let _ = writeln!(out);
    tweets(&mut out, shown, now);
    out
}

pub fn wallet_page(data: &WalletData, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    wallets(&mut out, &data.wallets);
    let _ = writeln!(out);
    transactions(&mut out, &data.transactions, now);
    out
}

pub fn notification_page(data: &NotificationData, shown: &[&Notification], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    notification_stats(&mut out, &data.stats);
    let _ = writeln!(out);
    notifications(&mut out, shown, now);
    out
}

pub fn subscription(data: &SubscriptionData) -> String {
    let s = &data.state;
    let mut out = String::new();
    let _ = writeln!(out, "Plan:    {} ({})", s.plan_name, s.status);
    let _ = writeln!(out, "Billing: {} {}", format_usd(s.amount), s.billing_cycle);
    if let Some(end) = s.trial_end_date {
        let _ = writeln!(out, "Trial ends: {}", end.format("%Y-%m-%d"));
    }
    if let Some(next) = s.next_billing_date {
        let _ = writeln!(out, "Next billing: {}", next.format("%Y-%m-%d"));
    }
    let _ = writeln!(
        out,
        "Follows: {}/{} ({:.0}%)  Notifications this month: {}",
        s.current_follows,
        s.max_follows,
        s.follow_usage() * 100.0,
        s.notifications_this_month
    );
    out
}

pub fn plans(data: &SubscriptionData) -> String {
    let mut out = String::new();
    for plan in &data.plans {
        let marker = if plan.recommended { " [recommended]" } else { "" };
        let _ = writeln!(
            out,
            "{:<12} {:<12} {:>8} / {}{}",
            plan.id,
            plan.name,
            format_usd(plan.price),
            plan.billing_cycle,
            marker
        );
        for feature in &plan.features {
            let _ = writeln!(out, "    - {}", feature);
        }
    }
    if out.is_empty() {
        out.push_str("No plans available.\n");
    }
    out
}

pub fn payments(data: &SubscriptionData) -> String {
    if data.payments.is_empty() {
        return "No payments.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<14} {:<20} {:>9} {:<8} {}",
        "Order", "Plan", "Amount", "Status", "Date"
    );
    let _ = writeln!(out, "{}", "-".repeat(66));
    for p in &data.payments {
        let _ = writeln!(
            out,
            "{:<14} {:<20} {:>9} {:<8} {}",
            p.order_id,
            truncate(&p.plan_name, 20),
            format_usd(p.amount),
            p.status,
            p.created_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn settings(settings: &UserSettings) -> String {
    let n = &settings.notifications;
    let s = &settings.security;
    let i = &settings.interface;
    let flag = |on: bool| if on { "on" } else { "off" };
    let mut out = String::new();
    let _ = writeln!(out, "Notifications:");
    let _ = writeln!(
        out,
        "  email {}  sms {}  push {}  frequency {}",
        flag(n.email_notifications),
        flag(n.sms_notifications),
        flag(n.push_notifications),
        n.alert_frequency
    );
    let _ = writeln!(
        out,
        "  twitter {}  wallet {}  price {}  system {}",
        flag(n.twitter_alerts),
        flag(n.wallet_alerts),
        flag(n.price_alerts),
        flag(n.system_alerts)
    );
    let _ = writeln!(out, "Security:");
    let _ = writeln!(
        out,
        "  two-factor {}  login alerts {}  session timeout {}",
        flag(s.two_factor_enabled),
        flag(s.login_alerts),
        s.session_timeout
    );
    let _ = writeln!(out, "Interface:");
    let _ = writeln!(
        out,
        "  theme {}  language {}  timezone {}  currency {}",
        i.theme, i.language, i.timezone, i.currency
    );
    let _ = writeln!(
        out,
        "  auto refresh {} every {}s",
        flag(i.auto_refresh),
        i.refresh_interval
    );
    out
}

fn direction(d: TransactionDirection) -> &'static str {
    match d {
        TransactionDirection::In => "in",
        TransactionDirection::Out => "out",
    }
}

pub fn twitter_profile(data: &TwitterProfileData, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let linked = &data.wallets;
    let _ = writeln!(out, "@{}", data.username);
    let _ = writeln!(
        out,
        "Linked wallets: {}  Total value: {}",
        linked.total_wallets.max(linked.wallets.len()),
        format_usd(linked.total_value_usd)
    );

    let _ = writeln!(out, "\n== Wallets ==");
    if linked.wallets.is_empty() {
        let _ = writeln!(out, "No linked wallets.");
    } else {
        let _ = writeln!(
            out,
            "{:<16} {:<10} {:>5} {:>12} {:>12} {}",
            "Address", "Chain", "Conf", "Value", "ETH", "Source"
        );
        let _ = writeln!(out, "{}", "-".repeat(80));
        for w in &linked.wallets {
            let _ = writeln!(
                out,
                "{:<16} {:<10} {:>4.0}% {:>12} {:>12.2} {}",
                w.short_address(),
                truncate(&w.blockchain, 10),
                w.confidence * 100.0,
                format_usd(w.balance.total_value_usd),
                w.balance.eth_balance,
                w.source
            );
            for tx in &w.recent_transactions {
                let _ = writeln!(
                    out,
                    "    {:<4} {:>10.2} ETH  {}",
                    direction(tx.direction),
                    tx.value,
                    relative_time(tx.timestamp, now)
                );
            }
        }
    }

    let portfolio = &data.portfolio;
    let _ = writeln!(
        out,
        "\n== Portfolio ({}, diversification {:.1}, {} risk) ==",
        format_usd(portfolio.total_value_usd),
        portfolio.diversification_score,
        portfolio.risk_level()
    );
    if portfolio.holdings.is_empty() {
        let _ = writeln!(out, "No holdings.");
    }
    for h in &portfolio.holdings {
        let _ = writeln!(
            out,
            "{:<8} {:<20} {:>12} {:>6.1}%",
            h.symbol,
            truncate(&h.name, 20),
            format_usd(h.value_usd),
            h.percentage
        );
    }

    let _ = writeln!(out, "\n== Connections ==");
    if data.connections.connections.is_empty() {
        let _ = writeln!(out, "No wallet connections.");
    }
    for c in &data.connections.connections {
        let _ = writeln!(
            out,
            "{} <-> {}  {} transfers, {}",
            short_address(&c.address1),
            short_address(&c.address2),
            c.direct_transactions,
            format_usd(c.total_volume)
        );
    }
    let patterns = &data.connections.exchange_patterns;
    if !patterns.exchange_interactions.is_empty() {
        let mut exchanges: Vec<_> = patterns.exchange_interactions.iter().collect();
        exchanges.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let list: Vec<String> = exchanges
            .iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();
        let _ = writeln!(out, "Exchanges: {}", list.join(", "));
    }
    out
}

pub fn user(user: &User, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}>", user.username, user.email);
    let _ = writeln!(out, "Account: {}", user.user_type);
    if let Some(days) = user.trial_days_left(now) {
        let _ = writeln!(out, "Trial days left: {}", days);
    }
    if let (Some(current), Some(max)) = (user.current_follows, user.max_follows) {
        let _ = writeln!(out, "Follows: {}/{}", current, max);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fallback;
    use crate::models::UserType;
    use chrono::Duration;

    #[test]
    fn test_fallback_banner() {
        let err = crate::client::HttpError::Timeout;
        let fetched = Fetched::fallback(1, &err);
        let banner = source_banner(&fetched);
        assert!(banner.starts_with("Showing sample data"));
    }

    #[test]
    fn test_dashboard_marks_sample_panels() {
        let data = DashboardData {
            tweets: fallback::dashboard_tweets(),
            wallets: fallback::wallet_overview(),
            holdings: fallback::holdings(),
            notifications: vec![],
            panels: [
                DataSource::Live,
                DataSource::Fallback,
                DataSource::Live,
                DataSource::Live,
            ],
        };
        let text = dashboard(&data, Utc::now());
        assert!(text.contains("== Latest tweets =="));
        assert!(text.contains("== Wallets (sample data) =="));
        assert!(text.contains("0x742d...b4C2"));
        assert!(text.contains("No notifications."));
        assert!(text.contains("Wallet value: $4.30M"));
    }

    #[test]
    fn test_unread_marker() {
        let list = fallback::notifications();
        let refs: Vec<_> = list.iter().collect();
        let mut out = String::new();
        notifications(&mut out, &refs, Utc::now());
        let unread_lines = out.lines().filter(|l| l.contains(" * ")).count();
        assert_eq!(unread_lines, 3);
    }

    #[test]
    fn test_twitter_profile_sample() {
        let data = TwitterProfileData {
            username: "vitalik".to_string(),
            wallets: fallback::linked_wallets(),
            portfolio: fallback::portfolio(),
            connections: fallback::connections(),
        };
        let text = twitter_profile(&data, Utc::now());
        assert!(text.starts_with("@vitalik\n"));
        assert!(text.contains("0x742d...b4C2"));
        assert!(text.contains("  90%"));
        assert!(text.contains("medium risk"));
        assert!(text.contains("Exchanges: Binance (8), Coinbase (5), Kraken (2)"));
    }

    #[test]
    fn test_user_trial_line() {
        let now = Utc::now();
        let user = User {
            id: "1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            user_type: UserType::Trial,
            trial_end_date: Some(now + Duration::hours(30)),
            max_follows: Some(5),
            current_follows: Some(3),
            avatar: None,
        };
        let text = super::user(&user, now);
        assert!(text.contains("Trial days left: 2"));
        assert!(text.contains("Follows: 3/5"));
    }
}
