//! HTTP client for the monitoring REST API.

use super::{AuthEvent, HttpError, HttpResult};
use crate::config::ApiConfig;
use crate::models::{Envelope, TokenPair, Validate};
use crate::session::{Session, SessionStore};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

/// Token refresh endpoint; a 401 here is never answered with another refresh
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Endpoints where a 401 means bad credentials rather than an expired token
const CREDENTIAL_PATHS: [&str; 2] = ["/auth/login", "/auth/register"];

/// Authenticated client for the monitoring API
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    /// Serializes token rotation across concurrent requests
    refresh_lock: Mutex<()>,
    events: broadcast::Sender<AuthEvent>,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionStore>) -> HttpResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(HttpError::from_transport)?;

        let (events, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Receive [`AuthEvent`]s raised by failed refreshes
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> HttpResult<T> {
        self.request(Method::GET, path, None).await
    }

    /// GET an endpoint that wraps its payload in `{"data": ...}` and validate it
    pub async fn get_data<T>(&self, path: &str) -> HttpResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        let envelope: Envelope<T> = self.get(path).await?;
        validated(path, envelope.data)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> HttpResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(encode(body)?)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> HttpResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(encode(body)?)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> HttpResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(encode(body)?)).await
    }

    pub async fn delete(&self, path: &str) -> HttpResult<()> {
        let _: Value = self.request(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue a request and decode the JSON response.
    ///
    /// An empty body decodes as `null`, so `T = ()` or `serde_json::Value`
    /// work for endpoints that return nothing.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> HttpResult<T> {
        let text = self.execute(method, path, body).await?;
        decode(path, &text)
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> HttpResult<String> {
        let sent_token = self.session.get().map(|s| s.access_token);
        let response = self
            .send(&method, path, body.as_ref(), sent_token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(response).await;
        }

        if is_refresh_path(path) {
            tracing::warn!(endpoint = path, "Refresh endpoint rejected the session");
            self.expire_session();
            return Err(HttpError::SessionExpired);
        }

        let stale = match sent_token {
            Some(token) if !is_credential_path(path) => token,
            // Nothing to refresh: anonymous call or bad credentials
            _ => return read_body(response).await,
        };

        let fresh = self.refresh_access_token(&stale).await?;

        tracing::debug!(endpoint = path, "Replaying request with refreshed token");
        let retry = self.send(&method, path, body.as_ref(), Some(&fresh)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(endpoint = path, "Request rejected again after token refresh");
        }
        read_body(retry).await
    }

    /// Rotate the token pair, or pick up a rotation another request already did.
    async fn refresh_access_token(&self, stale: &str) -> HttpResult<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = match self.session.get() {
            Some(session) => session,
            // A concurrent refresh failed and cleared the session
            None => return Err(HttpError::SessionExpired),
        };

        if current.access_token != stale {
            tracing::debug!("Token already rotated by a concurrent request");
            return Ok(current.access_token);
        }

        tracing::info!("Access token rejected, refreshing session");
        let start = Instant::now();

        let result: HttpResult<TokenPair> = async {
            let body = serde_json::json!({ "refresh_token": current.refresh_token });
            let response = self
                .send(&Method::POST, REFRESH_PATH, Some(&body), Some(&current.access_token))
                .await?;
            let text = read_body(response).await?;
            validated(REFRESH_PATH, decode::<TokenPair>(REFRESH_PATH, &text)?)
        }
        .await;

        match result {
            Ok(pair) => {
                let session = Session::new(pair.access_token, pair.refresh_token);
                let access = session.access_token.clone();
                self.session.set(session)?;
                tracing::info!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Session refreshed"
                );
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                self.expire_session();
                Err(HttpError::SessionExpired)
            }
        }
    }

    /// Drop the session and tell the shell to route to login
    pub fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session");
        }
        // No subscribers is fine
        let _ = self.events.send(AuthEvent::LoginRequired);
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> HttpResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header("x-request-id", &request_id);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(request_id = %request_id, endpoint = path, error = %e, "Request failed");
            HttpError::from_transport(e)
        })?;

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            endpoint = path,
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "API call"
        );

        Ok(response)
    }
}

fn is_refresh_path(path: &str) -> bool {
    path.split('?').next() == Some(REFRESH_PATH)
}

fn is_credential_path(path: &str) -> bool {
    let bare = path.split('?').next().unwrap_or(path);
    CREDENTIAL_PATHS.contains(&bare)
}

async fn read_body(response: Response) -> HttpResult<String> {
    let status = response.status();
    let text = response.text().await.map_err(HttpError::from_transport)?;

    if status.is_success() {
        Ok(text)
    } else {
        Err(HttpError::Status {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    body.trim().to_string()
}

fn encode<B: Serialize + ?Sized>(body: &B) -> HttpResult<Value> {
    serde_json::to_value(body).map_err(|e| HttpError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> HttpResult<T> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| HttpError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn validated<T: Validate>(endpoint: &str, value: T) -> HttpResult<T> {
    value.validate().map_err(|message| HttpError::Decode {
        endpoint: endpoint.to_string(),
        message,
    })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::session::MemorySessionStore;
    use crate::testing::{unreachable_base_url, MockApi};

    fn expired_store(mock: &MockApi) -> Arc<MemorySessionStore> {
        let valid = mock.valid_session();
        Arc::new(MemorySessionStore::with_session(Session::new(
            "expired-token",
            valid.refresh_token,
        )))
    }

    #[tokio::test]
    async fn test_bearer_header_attached() {
        let mock = MockApi::start().await;
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        let client = mock.client(store);

        let user: User = client.get("/auth/me").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(mock.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_once_and_replays() {
        let mock = MockApi::start().await;
        let store = expired_store(&mock);
        let client = mock.client(store.clone());

        let user: User = client.get("/auth/me").await.unwrap();
        assert_eq!(user.username, "alice");

        assert_eq!(mock.refresh_calls(), 1);
        assert_eq!(mock.hits("GET /auth/me"), 2);
        assert_eq!(store.get(), Some(mock.valid_session()));
    }

    #[tokio::test]
    async fn test_second_401_does_not_loop() {
        let mock = MockApi::start().await;
        let store = expired_store(&mock);
        let client = mock.client(store.clone());

        let err = client.get::<Value>("/always-401").await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        assert_eq!(mock.refresh_calls(), 1);
        assert_eq!(mock.hits("GET /always-401"), 2);
        // The refresh itself succeeded, so the session survives
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_session() {
        let mock = MockApi::start().await;
        let store = Arc::new(MemorySessionStore::with_session(Session::new(
            "expired-token",
            "revoked-refresh",
        )));
        let client = mock.client(store.clone());
        let mut events = client.subscribe();

        let err = client.get::<User>("/auth/me").await.unwrap_err();
        assert!(matches!(err, HttpError::SessionExpired));

        assert_eq!(mock.refresh_calls(), 1);
        assert_eq!(mock.hits("GET /auth/me"), 1);
        assert!(store.get().is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::LoginRequired);
    }

    #[tokio::test]
    async fn test_401_on_refresh_call_is_not_nested() {
        let mock = MockApi::start().await;
        let store = Arc::new(MemorySessionStore::with_session(Session::new(
            "expired-token",
            "revoked-refresh",
        )));
        let client = mock.client(store.clone());
        let mut events = client.subscribe();

        let body = serde_json::json!({ "refresh_token": "revoked-refresh" });
        let err = client
            .post::<_, Value>(REFRESH_PATH, &body)
            .await
            .unwrap_err();

        assert!(matches!(err, HttpError::SessionExpired));
        assert_eq!(mock.refresh_calls(), 1);
        assert!(store.get().is_none());
        assert_eq!(events.try_recv().unwrap(), AuthEvent::LoginRequired);
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let mock = MockApi::start().await;
        let store = expired_store(&mock);
        let client = mock.client(store.clone());

        let (a, b) = tokio::join!(
            client.get::<User>("/auth/me"),
            client.get_data::<Vec<crate::models::MonitoredAccount>>("/twitter/accounts"),
        );

        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(mock.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let mock = MockApi::start().await;
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        let client = mock.client(store);

        let err = client.get::<Value>("/broken").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.hits("GET /broken"), 1);
        assert_eq!(mock.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_refresh() {
        let mock = MockApi::start().await;
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        let client = mock.client(store.clone());

        let body = serde_json::json!({ "email": "alice@example.com", "password": "nope" });
        let err = client
            .post::<_, Value>("/auth/login", &body)
            .await
            .unwrap_err();

        match err {
            HttpError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(mock.refresh_calls(), 0);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let config = ApiConfig {
            base_url: unreachable_base_url(),
            request_timeout_secs: 2,
        };
        let client = ApiClient::new(&config, Arc::new(MemorySessionStore::new())).unwrap();

        let err = client.get::<Value>("/auth/me").await.unwrap_err();
        assert!(matches!(err, HttpError::Network(_) | HttpError::Timeout));
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_decode_error() {
        let mock = MockApi::start().await;
        mock.corrupt("/twitter/accounts");
        let store = Arc::new(MemorySessionStore::with_session(mock.valid_session()));
        let client = mock.client(store);

        let err = client
            .get_data::<Vec<crate::models::MonitoredAccount>>("/twitter/accounts")
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Decode { .. }));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"detail": "nope"}"#), "nope");
        assert_eq!(error_message(r#"{"error": "bad"}"#), "bad");
        assert_eq!(error_message(" plain text \n"), "plain text");
    }

    #[test]
    fn test_empty_body_decodes_as_unit() {
        let unit: () = decode("/x", "").unwrap();
        assert_eq!(unit, ());
    }

    #[test]
    fn test_path_classification() {
        assert!(is_refresh_path("/auth/refresh"));
        assert!(!is_refresh_path("/auth/refresh-all"));
        assert!(is_credential_path("/auth/login"));
        assert!(!is_credential_path("/auth/me"));
    }
}
