//! Delivery timestamps with a clock abstraction for testability.

use chrono::Local;

/// Layout of the timestamp stamped on every delivered chat line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current local time rendered with `TIMESTAMP_FORMAT`
    fn timestamp(&self) -> String;
}

/// System clock implementation (uses local wall time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone)]
pub struct FixedClock {
    fixed: String,
}

impl FixedClock {
    pub fn new(fixed: impl Into<String>) -> Self {
        Self {
            fixed: fixed.into(),
        }
    }
}

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.fixed.clone()
    }
}
