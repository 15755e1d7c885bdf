//! Monitoring API client
//!
//! Wraps every outbound call with bearer-token injection and a transparent
//! refresh-and-retry on 401.
//!
//! ## Auth flow
//!
//! ```text
//! request ──► 401? ──no──► body / HttpError::Status
//!               │
//!               yes (not the refresh call, first attempt)
//!               ▼
//!        POST /auth/refresh ──fail──► clear session, AuthEvent::LoginRequired
//!               │ ok
//!               ▼
//!        store new pair, replay once ──401──► HttpError::Status(401), no loop
//! ```

pub mod endpoints;
mod error;
mod http;

pub use error::{HttpError, HttpResult};
pub use http::{ApiClient, REFRESH_PATH};
pub(crate) use http::validated;

/// Signals from the client to whoever owns navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The session could not be recovered; the user must log in again
    LoginRequired,
}
