//! REST endpoint paths, relative to the configured `/api/v1` base

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const ME: &str = "/auth/me";
pub const LOGOUT: &str = "/auth/logout";
pub const SEND_VERIFICATION_CODE: &str = "/auth/send_verification_code";

pub const TWITTER_POSTS: &str = "/twitter/posts";
pub const TWITTER_ACCOUNTS: &str = "/twitter/accounts";

pub const WALLET_LIST: &str = "/wallet/list";
pub const WALLET_OVERVIEW: &str = "/wallet/overview";
pub const WALLET_TRANSACTIONS: &str = "/wallet/transactions";
pub const WALLET_ADD: &str = "/wallet/add";

pub const HOLDINGS: &str = "/blackrock/holdings";

pub const NOTIFICATIONS: &str = "/notifications";
pub const NOTIFICATION_LIST: &str = "/notifications/list";
pub const NOTIFICATION_STATS: &str = "/notifications/stats";
pub const NOTIFICATION_MARK_READ: &str = "/notifications/mark-read";
pub const NOTIFICATION_DELETE: &str = "/notifications/delete";

pub const SUBSCRIPTION_STATUS: &str = "/subscription/status";
pub const SUBSCRIPTION_PLANS: &str = "/subscription/plans";
pub const SUBSCRIPTION_UPGRADE: &str = "/subscription/upgrade";
pub const SUBSCRIPTION_CANCEL: &str = "/subscription/cancel";
pub const PAYMENT_HISTORY: &str = "/subscription/payment-history";

pub const USER_SETTINGS: &str = "/users/settings";
pub const USER_PROFILE: &str = "/users/profile";
pub const NOTIFICATION_SETTINGS: &str = "/users/notification-settings";
pub const SECURITY_SETTINGS: &str = "/users/security-settings";
pub const INTERFACE_SETTINGS: &str = "/users/interface-settings";
pub const CHANGE_PASSWORD: &str = "/users/change-password";
pub const DELETE_ACCOUNT: &str = "/users/account";

pub fn with_limit(path: &str, limit: usize) -> String {
    format!("{}?limit={}", path, limit)
}

pub fn twitter_account(id: &str) -> String {
    format!("{}/{}", TWITTER_ACCOUNTS, urlencoding::encode(id))
}

pub fn wallet(id: &str) -> String {
    format!("/wallet/{}", urlencoding::encode(id))
}

/// Linked wallets of a Twitter user
pub fn twitter_user(username: &str) -> String {
    format!("/wallet/twitter/{}", urlencoding::encode(username))
}

pub fn twitter_user_portfolio(username: &str) -> String {
    format!("{}/portfolio", twitter_user(username))
}

pub fn twitter_user_connections(username: &str) -> String {
    format!("{}/connections", twitter_user(username))
}

pub fn oauth_authorize(provider: &str) -> String {
    format!("/oauth/{}/authorize", provider)
}

pub fn oauth_callback(provider: &str) -> String {
    format!("/oauth/{}/callback", provider)
}
