//! App Shell
//!
//! Holds the signed-in user and the current route, performs the auth
//! flows, and guards protected routes. The HTTP client reports an
//! unrecoverable session through [`AuthEvent::LoginRequired`]; the shell
//! reacts by dropping the user and routing to Login.
//!
//! A stored session whose user cannot be loaded because the API is
//! unreachable is kept: the shell stays signed in without a user until the
//! client reports the session dead.

use crate::client::{endpoints, validated, ApiClient, AuthEvent, HttpError};
use crate::models::{
    AuthResponse, AuthorizeUrl, LoginRequest, OAuthCallback, OAuthProvider, RegisterRequest,
    User,
};
use crate::session::{Session, SessionError};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    TwitterMonitor,
    WalletMonitor,
    Holdings,
    Notifications,
    Settings,
    Upgrade,
    Login,
    Register,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Dashboard,
        Route::TwitterMonitor,
        Route::WalletMonitor,
        Route::Holdings,
        Route::Notifications,
        Route::Settings,
        Route::Upgrade,
        Route::Login,
        Route::Register,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::TwitterMonitor => "/twitter-monitor",
            Route::WalletMonitor => "/wallet-monitor",
            Route::Holdings => "/blackrock",
            Route::Notifications => "/notifications",
            Route::Settings => "/settings",
            Route::Upgrade => "/upgrade",
            Route::Login => "/login",
            Route::Register => "/register",
        }
    }

    /// Everything except Login and Register requires a signed-in user
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "/" {
            return Ok(Route::Dashboard);
        }
        Route::ALL
            .into_iter()
            .find(|r| r.path() == s)
            .ok_or_else(|| format!("unknown route: {}", s))
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Session storage failed: {0}")]
    Session(#[from] SessionError),
}

pub type ShellResult<T> = Result<T, ShellError>;

fn required(field: &str, value: &str) -> ShellResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShellError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

pub struct AppShell {
    client: Arc<ApiClient>,
    user: Option<User>,
    /// Session restored while the user could not be loaded
    offline: bool,
    route: Route,
    events: broadcast::Receiver<AuthEvent>,
}

impl AppShell {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let events = client.subscribe();
        Self {
            client,
            user: None,
            offline: false,
            route: Route::Login,
            events,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Signed in with a loaded user, or holding a session restored offline
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some() || (self.offline && self.client.session().is_authenticated())
    }

    /// Restore the user from a persisted session.
    ///
    /// Only an auth failure discards the session. Any other error (network,
    /// timeout, server error, bad payload) keeps it and leaves the shell
    /// signed in without a user.
    pub async fn bootstrap(&mut self) -> Option<&User> {
        if !self.client.session().is_authenticated() {
            self.route = Route::Login;
            return None;
        }

        match self.fetch_user().await {
            Ok(user) => {
                tracing::info!(user = %user.username, "Session restored");
                self.user = Some(user);
                self.offline = false;
                self.route = Route::Dashboard;
            }
            Err(e) if e.is_auth() => {
                tracing::warn!(error = %e, "Stored session is not usable, signing out");
                if let Err(e) = self.client.session().clear() {
                    tracing::error!(error = %e, "Failed to clear session");
                }
                self.user = None;
                self.offline = false;
                self.route = Route::Login;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load user, keeping stored session");
                self.user = None;
                self.offline = true;
                self.route = Route::Dashboard;
            }
        }
        self.user.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ShellResult<&User> {
        let request = LoginRequest {
            email: required("email", email)?,
            password: password.to_string(),
        };
        if request.password.is_empty() {
            return Err(ShellError::Validation("password must not be empty".to_string()));
        }

        let response: AuthResponse = self.client.post(endpoints::LOGIN, &request).await?;
        self.sign_in(endpoints::LOGIN, response).await
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> ShellResult<()> {
        let request = RegisterRequest {
            username: required("username", &request.username)?,
            email: required("email", &request.email)?,
            password: request.password.clone(),
            verification_code: request
                .verification_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };
        if request.password.is_empty() {
            return Err(ShellError::Validation("password must not be empty".to_string()));
        }

        let _: Value = self.client.post(endpoints::REGISTER, &request).await?;
        tracing::info!(username = %request.username, "Registered");
        self.route = Route::Login;
        Ok(())
    }

    pub async fn send_verification_code(&self, email: &str) -> ShellResult<()> {
        let email = required("email", email)?;
        let _: Value = self
            .client
            .post(endpoints::SEND_VERIFICATION_CODE, &json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// URL of the provider's consent page
    pub async fn oauth_authorize_url(&self, provider: OAuthProvider) -> ShellResult<String> {
        let path = endpoints::oauth_authorize(provider.as_str());
        let response: AuthorizeUrl = self.client.get(&path).await?;
        Ok(validated(&path, response)?.authorization_url)
    }

    /// Complete a provider sign-in with the code it redirected back with
    pub async fn oauth_callback(
        &mut self,
        provider: OAuthProvider,
        code: &str,
        state: Option<&str>,
    ) -> ShellResult<&User> {
        let callback = OAuthCallback {
            code: required("code", code)?,
            state: state.map(str::to_string),
        };
        let path = endpoints::oauth_callback(provider.as_str());
        let response: AuthResponse = self.client.post(&path, &callback).await?;
        self.sign_in(&path, response).await
    }

    /// Always ends signed out, even if the server call fails
    pub async fn logout(&mut self) -> ShellResult<()> {
        if self.client.session().is_authenticated() {
            if let Err(e) = self
                .client
                .post::<_, Value>(endpoints::LOGOUT, &json!({}))
                .await
            {
                tracing::warn!(error = %e, "Logout call failed; clearing local session anyway");
            }
        }
        self.user = None;
        self.offline = false;
        self.route = Route::Login;
        self.client.session().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Go to `route`, or to Login when it is protected and nobody is signed in.
    /// Returns where the shell ended up.
    pub fn navigate(&mut self, route: Route) -> Route {
        self.pump_auth_events();
        self.route = if route.is_protected() && !self.is_signed_in() {
            tracing::debug!(requested = %route, "Redirecting to login");
            Route::Login
        } else {
            route
        };
        self.route
    }

    pub fn handle_auth_event(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::LoginRequired => {
                if self.user.take().is_some() || self.offline {
                    tracing::info!("Session expired, login required");
                }
                self.offline = false;
                self.route = Route::Login;
            }
        }
    }

    /// Apply every auth event the client has emitted since the last call
    pub fn pump_auth_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_auth_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Missed auth events");
                    if !self.client.session().is_authenticated() {
                        self.handle_auth_event(AuthEvent::LoginRequired);
                        handled += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    pub fn trial_days_left(&self) -> Option<i64> {
        self.trial_days_left_at(Utc::now())
    }

    pub fn trial_days_left_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.user.as_ref()?.trial_days_left(now)
    }

    async fn fetch_user(&self) -> Result<User, HttpError> {
        let user: User = self.client.get(endpoints::ME).await?;
        validated(endpoints::ME, user)
    }

    /// Store the new token pair and load the user. The pair is discarded
    /// again when no user can be loaded.
    async fn sign_in(&mut self, endpoint: &str, response: AuthResponse) -> ShellResult<&User> {
        let response = validated(endpoint, response)?;
        // /auth/me authenticates with the stored pair, so it is stored first
        self.client
            .session()
            .set(Session::new(response.access_token, response.refresh_token))?;

        let user = match response.user {
            Some(user) => user,
            None => match self.fetch_user().await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "Signed in but the user could not be loaded, discarding tokens");
                    self.client.session().clear()?;
                    return Err(e.into());
                }
            },
        };
        tracing::info!(user = %user.username, "Signed in");

        // Drop events from before this sign-in
        while self.events.try_recv().is_ok() {}
        self.offline = false;
        self.route = Route::Dashboard;
        Ok(&*self.user.insert(user))
    }
}
