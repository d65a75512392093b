//! Navigation State Machine
//!
//! ```text
//! Idle
//!   ├─ window full ──→ Throttled
//!   └─ fetch ───────→ Requesting
//!                       ├─ 2xx ─────────→ Success
//!                       ├─ sentinel ────→ Redirected ──→ Requesting
//!                       ├─ superseded ──→ Cancelled
//!                       └─ error ───────→ Failed
//! ```
//!
//! Throttled, Success, Cancelled and Failed settle back to Idle when the
//! next attempt starts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationState {
    /// No navigation attempt outstanding
    #[default]
    Idle,
    /// The last attempt was rejected by the throttle window
    Throttled,
    /// A fragment request is in flight
    Requesting,
    /// The server answered with the redirect sentinel
    Redirected,
    /// The fragment was displayed or handed to the browser
    Success,
    /// A newer navigation superseded the request
    Cancelled,
    /// Transport failure or HTTP error status
    Failed,
}

impl NavigationState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: NavigationState) -> bool {
        use NavigationState::*;

        match (self, target) {
            (Idle, Throttled) | (Idle, Requesting) => true,
            (Requesting, Success)
            | (Requesting, Redirected)
            | (Requesting, Cancelled)
            | (Requesting, Failed) => true,
            (Redirected, Requesting) => true,
            (from, Idle) if from.is_settled() => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// Terminal for the attempt that reached it
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            NavigationState::Throttled
                | NavigationState::Success
                | NavigationState::Cancelled
                | NavigationState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationState::Idle => "idle",
            NavigationState::Throttled => "throttled",
            NavigationState::Requesting => "requesting",
            NavigationState::Redirected => "redirected",
            NavigationState::Success => "success",
            NavigationState::Cancelled => "cancelled",
            NavigationState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NavigationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(NavigationState::Idle),
            "throttled" => Ok(NavigationState::Throttled),
            "requesting" => Ok(NavigationState::Requesting),
            "redirected" => Ok(NavigationState::Redirected),
            "success" => Ok(NavigationState::Success),
            "cancelled" => Ok(NavigationState::Cancelled),
            "failed" => Ok(NavigationState::Failed),
            _ => Err(format!("Unknown navigation state: {}", s)),
        }
    }
}
