//! In-process stand-in for the monitoring API, used by unit tests.
//!
//! Tokens are `access-N` / `refresh-N`; every successful refresh rotates
//! both. Request counts are kept per `"METHOD /path"` key.

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::session::{Session, SessionStore};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub(crate) const PASSWORD: &str = "correct-horse";

pub(crate) struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::new());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/v1", addr),
            state,
            task,
        }
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: 5,
        }
    }

    pub fn client(&self, store: Arc<dyn SessionStore>) -> ApiClient {
        ApiClient::new(&self.config(), store).unwrap()
    }

    /// The pair the server currently accepts
    pub fn valid_session(&self) -> Session {
        let tokens = self.state.tokens.lock().unwrap();
        Session::new(tokens.0.clone(), tokens.1.clone())
    }

    pub fn hits(&self, key: &str) -> usize {
        self.state.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Answer 503 to everything
    pub fn set_offline(&self, offline: bool) {
        self.state.offline.store(offline, Ordering::SeqCst);
    }

    /// Make a GET endpoint return a payload of the wrong shape
    pub fn corrupt(&self, path: &str) {
        self.state.corrupt.lock().unwrap().insert(path.to_string());
    }

    /// Make any request to `path` fail with 500
    pub fn fail(&self, path: &str) {
        self.state.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn account_usernames(&self) -> Vec<String> {
        self.state
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| a["username"].as_str().map(String::from))
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A base URL nothing is listening on
pub(crate) fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1", addr)
}

pub(crate) struct MockState {
    tokens: Mutex<(String, String)>,
    rotations: AtomicUsize,
    refresh_calls: AtomicUsize,
    hits: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
    corrupt: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    next_id: AtomicUsize,
    accounts: Mutex<Vec<Value>>,
    wallets: Mutex<Vec<Value>>,
    notifications: Mutex<Vec<Value>>,
    subscription: Mutex<Value>,
}

impl MockState {
    fn new() -> Self {
        Self {
            tokens: Mutex::new(("access-0".to_string(), "refresh-0".to_string())),
            rotations: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            hits: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            corrupt: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
            next_id: AtomicUsize::new(100),
            accounts: Mutex::new(vec![
                json!({"id": "1", "username": "elonmusk", "display_name": "Elon Musk", "is_active": true, "is_verified": true}),
                json!({"id": "2", "username": "cz_binance", "display_name": "CZ", "is_active": false, "is_verified": true}),
            ]),
            wallets: Mutex::new(vec![json!({
                "id": "1",
                "address": "0x742d35Cc6634C0532925a3b8D4C2F2b4C2F2b4C2",
                "label": "Whale",
                "current_value": 1000.0,
                "change_24h": 1.5,
                "is_active": true
            })]),
            notifications: Mutex::new(vec![
                json!({"id": 1, "type": "twitter", "title": "New post", "content": "gm", "is_read": false, "created_at": "2024-01-15T10:30:00Z"}),
                json!({"id": 2, "type": "wallet", "title": "Large transfer", "content": "500 BTC", "is_read": false, "created_at": "2024-01-15T09:30:00Z"}),
                json!({"id": 3, "type": "system", "title": "Maintenance", "content": "", "is_read": true, "created_at": "2024-01-14T09:30:00Z"}),
            ]),
            subscription: Mutex::new(json!({
                "status": "trial",
                "plan_id": "trial",
                "plan_name": "Free trial",
                "max_follows": 5,
                "current_follows": 2
            })),
        }
    }

    fn issue_tokens(&self) -> (String, String) {
        let n = self.rotations.fetch_add(1, Ordering::SeqCst) + 1;
        let pair = (format!("access-{}", n), format!("refresh-{}", n));
        *self.tokens.lock().unwrap() = pair.clone();
        pair
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.tokens.lock().unwrap().0);
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == expected)
            .unwrap_or(false)
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

fn user() -> Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.com",
        "user_type": "TRIAL",
        "trial_end_date": "2099-01-01T00:00:00Z"
    })
}

fn data(value: Value) -> Response {
    Json(json!({ "data": value })).into_response()
}

fn status(code: StatusCode, detail: &str) -> Response {
    (code, Json(json!({ "detail": detail }))).into_response()
}

fn ids(body: &Value) -> Vec<String> {
    body["notification_ids"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .map(|id| match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn id_of(item: &Value) -> String {
    match &item["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn set_active(list: &Mutex<Vec<Value>>, id: &str, body: &Value) -> Response {
    let mut list = list.lock().unwrap();
    match list.iter_mut().find(|item| id_of(item) == id) {
        Some(item) => {
            item["is_active"] = body["is_active"].clone();
            data(item.clone())
        }
        None => status(StatusCode::NOT_FOUND, "not found"),
    }
}

fn remove(list: &Mutex<Vec<Value>>, id: &str) -> Response {
    let mut list = list.lock().unwrap();
    let before = list.len();
    list.retain(|item| id_of(item) != id);
    if list.len() == before {
        status(StatusCode::NOT_FOUND, "not found")
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api/v1").to_string();
    *state
        .hits
        .lock()
        .unwrap()
        .entry(format!("{} {}", method, path))
        .or_insert(0) += 1;

    if state.offline.load(Ordering::SeqCst) {
        return status(StatusCode::SERVICE_UNAVAILABLE, "offline");
    }
    if state.failing.lock().unwrap().contains(&path) {
        return status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    }

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    // Public endpoints
    match (method.as_str(), path.as_str()) {
        ("POST", "/auth/login") => {
            if body["email"] == "alice@example.com" && body["password"] == PASSWORD {
                let (access, refresh) = state.issue_tokens();
                return Json(json!({"access_token": access, "refresh_token": refresh, "user": user()}))
                    .into_response();
            }
            return status(StatusCode::UNAUTHORIZED, "invalid credentials");
        }
        ("POST", "/auth/refresh") => {
            state.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let current = state.tokens.lock().unwrap().1.clone();
            if body["refresh_token"] == current.as_str() {
                let (access, refresh) = state.issue_tokens();
                return Json(json!({"access_token": access, "refresh_token": refresh}))
                    .into_response();
            }
            return status(StatusCode::UNAUTHORIZED, "refresh token revoked");
        }
        ("POST", "/auth/register") => {
            if body["username"].as_str().unwrap_or("").is_empty() {
                return status(StatusCode::UNPROCESSABLE_ENTITY, "username required");
            }
            return (StatusCode::CREATED, Json(json!({"id": state.next_id()}))).into_response();
        }
        ("POST", "/auth/send_verification_code") => return Json(json!({"sent": true})).into_response(),
        ("GET", p) if p.starts_with("/oauth/") && p.ends_with("/authorize") => {
            let provider = p.trim_start_matches("/oauth/").trim_end_matches("/authorize");
            return Json(json!({
                "authorization_url": format!("https://{}.example/authorize?state=xyz", provider)
            }))
            .into_response();
        }
        ("POST", p) if p.starts_with("/oauth/") && p.ends_with("/callback") => {
            if body["code"] != "good-code" {
                return status(StatusCode::BAD_REQUEST, "invalid code");
            }
            let (access, refresh) = state.issue_tokens();
            return Json(json!({"access_token": access, "refresh_token": refresh}))
                .into_response();
        }
        ("GET", "/always-401") => return status(StatusCode::UNAUTHORIZED, "never"),
        _ => {}
    }

    if !state.authorized(&headers) {
        return status(StatusCode::UNAUTHORIZED, "token expired");
    }

    if method == Method::GET && state.corrupt.lock().unwrap().contains(&path) {
        return data(json!("garbage"));
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["auth", "me"]) => Json(user()).into_response(),
        ("POST", ["auth", "logout"]) => StatusCode::NO_CONTENT.into_response(),
        ("GET", ["broken"]) => status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),

        ("GET", ["twitter", "posts"]) => data(json!([{
            "id": "10",
            "username": "elonmusk",
            "display_name": "Elon Musk",
            "content": "Bitcoin is the future",
            "published_at": "2024-01-15T10:30:00Z",
            "like_count": 15200
        }])),
        ("GET", ["twitter", "accounts"]) => data(Value::Array(state.accounts.lock().unwrap().clone())),
        ("POST", ["twitter", "accounts"]) => {
            let username = body["username"].as_str().unwrap_or("").to_string();
            let account = json!({"id": state.next_id(), "username": username, "display_name": username, "is_active": true});
            state.accounts.lock().unwrap().push(account.clone());
            (StatusCode::CREATED, Json(json!({"data": account}))).into_response()
        }
        ("PATCH", ["twitter", "accounts", id]) => set_active(&state.accounts, id, &body),
        ("DELETE", ["twitter", "accounts", id]) => remove(&state.accounts, id),

        ("GET", ["wallet", "list"]) | ("GET", ["wallet", "overview"]) => {
            data(Value::Array(state.wallets.lock().unwrap().clone()))
        }
        ("GET", ["wallet", "transactions"]) => data(json!([{
            "id": "1",
            "type": "in",
            "amount": "1000",
            "token": "ETH",
            "value": 2400000,
            "counterparty": "0xabc",
            "timestamp": "2024-01-15T09:15:00Z"
        }])),
        ("POST", ["wallet", "add"]) => {
            let wallet = json!({
                "id": state.next_id(),
                "address": body["address"],
                "label": body["label"],
                "current_value": 0.0,
                "change_24h": 0.0,
                "is_active": true
            });
            state.wallets.lock().unwrap().push(wallet.clone());
            (StatusCode::CREATED, Json(json!({"data": wallet}))).into_response()
        }
        ("GET", ["wallet", "twitter", "vitalik"]) => data(json!({
            "username": "vitalik",
            "wallets": [
                {
                    "address": "0x742d35Cc6634C0532925a3b8D4C2F2b4C2F2b4C2",
                    "blockchain": "ethereum",
                    "confidence": 0.95,
                    "source": "ens",
                    "balance_data": {"total_value_usd": 3000000, "eth_balance": 1200.0},
                    "recent_transactions": [{"type": "in", "value": 2.5, "timestamp": "2024-01-15T08:00:00Z"}]
                },
                {"address": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045", "confidence": 0.6}
            ],
            "total_wallets": 2,
            "total_value_usd": 3000000
        })),
        ("GET", ["wallet", "twitter", "vitalik", "portfolio"]) => data(json!({
            "username": "vitalik",
            "total_value_usd": 3000000,
            "holdings": [{"symbol": "ETH", "name": "Ethereum", "value_usd": 3000000, "percentage": 100.0}],
            "diversification_score": 10.0
        })),
        ("GET", ["wallet", "twitter", "vitalik", "connections"]) => data(json!({
            "username": "vitalik",
            "connections": [],
            "exchange_patterns": {"exchange_interactions": {"Coinbase": 4}, "most_used_exchange": "Coinbase", "exchange_diversity": 1}
        })),
        ("PATCH", ["wallet", id]) => set_active(&state.wallets, id, &body),
        ("DELETE", ["wallet", id]) => remove(&state.wallets, id),

        ("GET", ["blackrock", "holdings"]) => data(json!({
            "btc": {"total_holdings": 900000, "total_value_usd": 45000000000.0, "change_24h": 1.0},
            "eth": {"total_holdings": 2500000, "total_value_usd": 9000000000.0, "change_24h": -0.5},
            "trend_data": [{"date": "01-01", "btc_holdings": 890000, "eth_holdings": 2490000}],
            "recent_changes": []
        })),

        ("GET", ["notifications"]) | ("GET", ["notifications", "list"]) => {
            data(Value::Array(state.notifications.lock().unwrap().clone()))
        }
        ("GET", ["notifications", "stats"]) => {
            let list = state.notifications.lock().unwrap();
            let unread = list.iter().filter(|n| n["is_read"] == false).count();
            data(json!({"total": list.len(), "today": 0, "week": list.len(), "unread": unread}))
        }
        ("POST", ["notifications", "mark-read"]) => {
            let ids = ids(&body);
            for n in state.notifications.lock().unwrap().iter_mut() {
                if ids.contains(&id_of(n)) {
                    n["is_read"] = json!(true);
                }
            }
            Json(json!({"updated": ids.len()})).into_response()
        }
        ("POST", ["notifications", "delete"]) => {
            let ids = ids(&body);
            state
                .notifications
                .lock()
                .unwrap()
                .retain(|n| !ids.contains(&id_of(n)));
            Json(json!({"deleted": ids.len()})).into_response()
        }

        ("GET", ["subscription", "status"]) => data(state.subscription.lock().unwrap().clone()),
        ("GET", ["subscription", "plans"]) => data(json!([
            {"id": "basic", "name": "Basic", "price": 9.99, "features": ["10 accounts"]},
            {"id": "pro", "name": "Pro", "price": 29.99, "recommended": true}
        ])),
        ("GET", ["subscription", "payment-history"]) => data(json!([])),
        ("POST", ["subscription", "upgrade"]) => {
            let plan = body["plan_id"].as_str().unwrap_or("");
            if plan.is_empty() {
                return status(StatusCode::BAD_REQUEST, "plan required");
            }
            Json(json!({"payment_url": format!("https://pay.example/checkout/{}", plan)}))
                .into_response()
        }
        ("POST", ["subscription", "cancel"]) => {
            state.subscription.lock().unwrap()["status"] = json!("inactive");
            Json(json!({})).into_response()
        }

        ("GET", ["users", "settings"]) => data(json!({"interface": {"theme": "light"}})),
        ("PUT", ["users", "profile"])
        | ("PUT", ["users", "notification-settings"])
        | ("PUT", ["users", "security-settings"])
        | ("PUT", ["users", "interface-settings"]) => Json(json!({})).into_response(),
        ("DELETE", ["users", "account"]) => {
            // Revoke the session along with the account
            *state.tokens.lock().unwrap() = ("deleted".to_string(), "deleted".to_string());
            StatusCode::NO_CONTENT.into_response()
        }
        ("POST", ["users", "change-password"]) => {
            if body["old_password"] == PASSWORD {
                Json(json!({})).into_response()
            } else {
                status(StatusCode::BAD_REQUEST, "current password is wrong")
            }
        }

        _ => status(StatusCode::NOT_FOUND, "no such endpoint"),
    }
}
