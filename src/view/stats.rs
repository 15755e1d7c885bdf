//! Figures derived from loaded page data

use crate::fetch::{DashboardData, TwitterData};
use crate::models::{Notification, NotificationKind, Tweet};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;

/// Headline counters on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub followed_accounts: usize,
    pub active_wallets: usize,
    pub today_notifications: usize,
    pub total_wallet_value: f64,
}

impl DashboardStats {
    pub fn compute(data: &DashboardData, now: DateTime<Utc>) -> Self {
        Self {
            followed_accounts: data.tweets.len(),
            active_wallets: data.wallets.iter().filter(|w| w.is_active).count(),
            today_notifications: data
                .notifications
                .iter()
                .filter(|n| n.is_from_day_of(now))
                .count(),
            total_wallet_value: data.wallets.iter().map(|w| w.current_value).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterStats {
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub today_tweets: usize,
    pub total_engagement: u64,
}

impl TwitterStats {
    pub fn compute(data: &TwitterData, now: DateTime<Utc>) -> Self {
        Self {
            total_accounts: data.accounts.len(),
            active_accounts: data.accounts.iter().filter(|a| a.is_active).count(),
            today_tweets: data
                .tweets
                .iter()
                .filter(|t| t.published_at.date_naive() == now.date_naive())
                .count(),
            total_engagement: data.tweets.iter().map(engagement).sum(),
        }
    }
}

fn engagement(tweet: &Tweet) -> u64 {
    tweet.like_count + tweet.retweet_count
}

/// Read-state filter for the notification list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl FromStr for ReadFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ReadFilter::All),
            "unread" => Ok(ReadFilter::Unread),
            "read" => Ok(ReadFilter::Read),
            other => Err(format!("unknown read filter: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub kind: Option<NotificationKind>,
    pub read: ReadFilter,
    pub search: Option<String>,
}

impl NotificationFilter {
    pub fn matches(&self, n: &Notification) -> bool {
        if self.kind.is_some_and(|kind| kind != n.kind) {
            return false;
        }
        match self.read {
            ReadFilter::Unread if n.is_read => return false,
            ReadFilter::Read if !n.is_read => return false,
            _ => {}
        }
        match &self.search {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                n.title.to_lowercase().contains(&term) || n.content.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }

    /// Matching notifications, newest first
    pub fn apply<'a>(&self, notifications: &'a [Notification]) -> Vec<&'a Notification> {
        let mut out: Vec<&Notification> =
            notifications.iter().filter(|n| self.matches(n)).collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TweetOrder {
    #[default]
    Latest,
    Engagement,
}

impl FromStr for TweetOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latest" => Ok(TweetOrder::Latest),
            "engagement" => Ok(TweetOrder::Engagement),
            other => Err(format!("unknown tweet order: {}", other)),
        }
    }
}

/// Likes above which a tweet counts as high engagement
pub const HIGH_ENGAGEMENT_LIKES: u64 = 10_000;

#[derive(Debug, Clone, Default)]
pub struct TweetFilter {
    pub verified_only: bool,
    pub high_engagement: bool,
    pub search: Option<String>,
    pub order: TweetOrder,
}

impl TweetFilter {
    pub fn matches(&self, tweet: &Tweet) -> bool {
        if self.verified_only && !tweet.is_verified {
            return false;
        }
        if self.high_engagement && tweet.like_count <= HIGH_ENGAGEMENT_LIKES {
            return false;
        }
        match &self.search {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                tweet.content.to_lowercase().contains(&term)
                    || tweet.display_name.to_lowercase().contains(&term)
                    || tweet
                        .content_zh
                        .as_deref()
                        .is_some_and(|zh| zh.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    pub fn apply<'a>(&self, tweets: &'a [Tweet]) -> Vec<&'a Tweet> {
        let mut out: Vec<&Tweet> = tweets.iter().filter(|t| self.matches(t)).collect();
        match self.order {
            TweetOrder::Latest => out.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            TweetOrder::Engagement => out.sort_by_key(|t| std::cmp::Reverse(engagement(t))),
        }
        out
    }
}
