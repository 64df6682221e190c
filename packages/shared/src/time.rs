//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in UTC (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Current Unix timestamp in UTC (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to RFC 3339 in UTC.
///
/// Returns `None` when the timestamp is outside the range chrono can represent.
pub fn millis_to_rfc3339(timestamp_millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis).map(|dt| dt.to_rfc3339())
}
