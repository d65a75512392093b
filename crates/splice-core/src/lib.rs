//! Splice Core
//!
//! Partial-page navigation for server-rendered applications: link clicks
//! and form submissions become fragment requests whose HTML replaces a
//! content region, while the document hash keeps browser history in sync.
//!
//! Wiring:
//! ```text
//! host ──UiEvent──→ Navigator ──→ NavigationController ──→ Fetcher
//!                      ↑                   │
//!                      └──── Completion ───┘──→ DomBridge
//! ```

mod config;
mod controller;
mod error;
mod failure;
mod navigator;

pub use config::NavigationConfig;
pub use controller::{Dispatch, NavigationController};
pub use error::CoreError;
pub use failure::NavigationFailure;
pub use navigator::{Navigator, NavigatorHandle, UiEvent};

// Re-export the building blocks
pub use splice_dom::{
    AnchorAction, AnchorClick, ContentEvent, ContentRenderer, Cursor, DomBridge, FormMethod,
    FormSubmission, HeadlessDom, Interceptor, Modifiers, WarningToast,
};
pub use splice_fetch::{
    Completion, FetchError, FetchRequest, FetchResponse, Fetcher, Method, ReqwestFetcher,
    RequestHandle, RequestId,
};
pub use splice_navigation::{normalize_location, NavigationError, NavigationState};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
