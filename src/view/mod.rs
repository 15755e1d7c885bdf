//! Derived statistics, filters and text rendering of page data

pub mod format;
pub mod render;
mod stats;

pub use stats::{
    DashboardStats, NotificationFilter, ReadFilter, TweetFilter, TweetOrder, TwitterStats,
    HIGH_ENGAGEMENT_LIKES,
};
