//! HTTP client error types

use crate::session::SessionError;
use thiserror::Error;

/// Errors surfaced by [`super::ApiClient`]
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Request failed: {0}")]
    Network(reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    /// Non-2xx response. A 401 lands here only when no refresh was possible
    /// or the replayed request was rejected again.
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The refresh token was rejected; the session has been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Response body did not match the expected schema
    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    #[error("Session store error: {0}")]
    Session(#[from] SessionError),
}

impl HttpError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Network(err)
        }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the user has to authenticate again
    pub fn is_auth(&self) -> bool {
        matches!(self, HttpError::SessionExpired) || self.status() == Some(401)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::from_transport(err)
    }
}

/// Result type alias for client operations
pub type HttpResult<T> = Result<T, HttpError>;
