//! Refresh control lock
//!
//! A refresh click disarms the control for one animation period; clicks in
//! that period collapse into the one refresh already running.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RefreshLock {
    period: Duration,
    rearm_at: Option<Instant>,
}

impl RefreshLock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            rearm_at: None,
        }
    }

    /// Disarm the control if it is armed. Returns false while disarmed.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.expire(now);
        if self.rearm_at.is_some() {
            return false;
        }

        self.rearm_at = Some(now + self.period);
        true
    }

    /// Re-arm once the period has passed. Returns true on the call that
    /// re-arms.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.rearm_at {
            Some(deadline) if deadline <= now => {
                self.rearm_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.rearm_at.is_none()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.rearm_at
    }
}
