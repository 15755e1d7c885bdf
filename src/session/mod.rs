//! Session Store
//!
//! Holds the bearer/refresh token pair. The store is injected into the HTTP
//! client and the app shell; only login, token refresh and logout write to it.
//!
//! - **store**: file-backed and in-memory implementations
//! - **error**: Error types
//!
//! Expiry is not tracked here. The HTTP client discovers it reactively from
//! a 401 response.

mod error;
mod store;

pub use error::{SessionError, SessionResult};
pub use store::{FileSessionStore, MemorySessionStore};

use serde::{Deserialize, Serialize};

/// The live token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never end up in logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Persistent holder of at most one session
pub trait SessionStore: Send + Sync {
    /// Replace the stored session
    fn set(&self, session: Session) -> SessionResult<()>;

    /// Current session, if any
    fn get(&self) -> Option<Session>;

    /// Remove the stored session
    fn clear(&self) -> SessionResult<()>;

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_wire_keys() {
        let session = Session::new("a-token", "r-token");
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["accessToken"], "a-token");
        assert_eq!(json["refreshToken"], "r-token");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = Session::new("secret-access", "secret-refresh");
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret"));
    }
}
