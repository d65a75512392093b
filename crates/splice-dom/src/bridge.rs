//! The capability surface the navigation core needs from a page

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Notifications fired on the content region around a markup swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEvent {
    /// Markup is about to be replaced
    PreUpdate,
    /// New markup is attached
    Updated,
}

impl ContentEvent {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEvent::PreUpdate => "preupdate",
            ContentEvent::Updated => "updated",
        }
    }
}

impl std::fmt::Display for ContentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Default,
    Progress,
}

/// Transient warning shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningToast {
    pub message: String,
    /// How long the toast stays visible
    pub timeout: Duration,
}

impl WarningToast {
    pub fn new(message: impl Into<String>, timeout: Duration) -> Self {
        Self {
            message: message.into(),
            timeout,
        }
    }
}

/// Page operations used by the navigation core.
///
/// Implementations are driven from a single event loop; no method is
/// called concurrently with another.
pub trait DomBridge {
    /// Current markup of the content region
    fn content(&self) -> String;

    /// Replace the content region's markup
    fn set_content(&mut self, html: &str);

    /// Fire a notification on the content region
    fn dispatch(&mut self, event: ContentEvent);

    /// Current document URL, hash included
    fn location(&self) -> Url;

    /// Push a history entry; the document location becomes `url`
    fn push_history(&mut self, url: &Url);

    /// Leave fragment navigation and let the browser load `target`
    fn assign_location(&mut self, target: &str);

    /// Open `target` in a new browsing context
    fn open_new_context(&mut self, target: &str);

    fn set_cursor(&mut self, cursor: Cursor);

    fn warn(&mut self, toast: &WarningToast);

    /// Show the generic "server communication" error dialog
    fn show_server_error(&mut self);

    fn set_refresh_spinning(&mut self, spinning: bool);
}
