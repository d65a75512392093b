//! Fetch error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request was cancelled by its handle
    #[error("Request aborted")]
    Aborted,

    /// No response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No async runtime available")]
    NoRuntime,
}

impl FetchError {
    /// HTTP status of the failure, 0 when no response arrived
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Status { status, .. } => *status,
            _ => 0,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}
