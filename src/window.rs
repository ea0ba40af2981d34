// window.rs
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where `now` sits relative to the configured voting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePhase {
    BeforeStart,
    Open,
    AfterEnd,
}

/// Half-open interval `[start, end)` during which codes may be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl VoteWindow {
    /// A window with `start >= end` is accepted but is never open.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn phase(&self, now: DateTime<Utc>) -> VotePhase {
        if now < self.start {
            VotePhase::BeforeStart
        } else if now < self.end {
            VotePhase::Open
        } else {
            VotePhase::AfterEnd
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.phase(now) == VotePhase::Open
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
