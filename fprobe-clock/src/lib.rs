//! Clock abstraction for fprobe.
//!
//! Reports are stamped with the time the run finished. The stamp comes
//! through the `Clock` trait so report rendering stays deterministic in tests.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Trait for getting the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Returns the current time as an RFC 3339 string with second precision.
    fn now_rfc3339(&self) -> String {
        self.now_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing with a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    timestamp: DateTime<Utc>,
}

impl MockClock {
    /// Create a mock clock fixed at `unix_sec` seconds since the epoch.
    ///
    /// Out-of-range values clamp to the epoch.
    pub fn new(unix_sec: i64) -> Self {
        let timestamp = Utc
            .timestamp_opt(unix_sec, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self { timestamp }
    }

    /// Create a mock clock fixed at the given instant.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
