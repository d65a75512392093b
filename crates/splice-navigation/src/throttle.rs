//! Request throttle window
//!
//! Every navigation attempt records an expiry deadline. Attempts are
//! admitted while the number of live deadlines stays within capacity.
//! Rejected attempts still record their deadline, so a burst of clicks
//! keeps the window full until the burst has aged out.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Throttled,
}

#[derive(Debug, Clone)]
pub struct RequestWindow {
    /// Expiry deadlines, oldest first
    deadlines: VecDeque<Instant>,
    capacity: usize,
    period: Duration,
}

impl RequestWindow {
    pub fn new(capacity: usize, period: Duration) -> Self {
        Self {
            deadlines: VecDeque::with_capacity(capacity + 1),
            capacity,
            period,
        }
    }

    /// Record an attempt made at `now` and decide whether it may proceed.
    pub fn record(&mut self, now: Instant) -> Admission {
        self.expire(now);
        self.deadlines.push_back(now + self.period);

        if self.deadlines.len() > self.capacity {
            Admission::Throttled
        } else {
            Admission::Allowed
        }
    }

    /// Drop every entry whose deadline has passed. Returns how many expired.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut expired = 0;
        while self.deadlines.front().is_some_and(|deadline| *deadline <= now) {
            self.deadlines.pop_front();
            expired += 1;
        }
        expired
    }

    /// A completed request resets throttling.
    pub fn reset(&mut self) {
        self.deadlines.clear();
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.deadlines.front().copied()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
