//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] splice_navigation::NavigationError),

    #[error("DOM error: {0}")]
    Dom(#[from] splice_dom::DomError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] splice_fetch::FetchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Navigator has shut down")]
    Closed,
}
