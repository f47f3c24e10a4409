//! Transient status line (copy-link feedback).

use std::time::{Duration, Instant};

pub const COPIED: &str = "Copied!";
pub const COPY_FAILED: &str = "Could not copy.";
pub const DEFAULT_FLASH: Duration = Duration::from_millis(1800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
struct Flash {
    text: String,
    kind: StatusKind,
    until: Instant,
}

/// One message at a time; a new one replaces the old and restarts the timer.
#[derive(Debug, Clone)]
pub struct StatusFlash {
    duration: Duration,
    current: Option<Flash>,
}

impl StatusFlash {
    pub fn new(duration: Duration) -> Self {
        Self { duration, current: None }
    }

    pub fn show(&mut self, text: impl Into<String>, kind: StatusKind, now: Instant) {
        self.current = Some(Flash { text: text.into(), kind, until: now + self.duration });
    }

    /// Message still visible at `now`.
    pub fn current(&self, now: Instant) -> Option<(&str, StatusKind)> {
        self.current
            .as_ref()
            .filter(|f| now < f.until)
            .map(|f| (f.text.as_str(), f.kind))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|f| f.until)
    }

    /// Drop an expired message. Returns true if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|f| now >= f.until) {
            self.current = None;
            return true;
        }
        false
    }
}

impl Default for StatusFlash {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH)
    }
}
