//! Time handling shared across the workspace.
//!
//! Timestamps travel as Unix milliseconds. When a timestamp is rendered for
//! the wire or for the ops API it is formatted as RFC 3339 in JST (UTC+9),
//! the timezone the demo deployment logs in.

use chrono::{FixedOffset, TimeZone, Utc};

/// JST offset from UTC, in seconds.
const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock abstraction.
///
/// Components that stamp outgoing messages take an `Arc<dyn Clock>` so tests
/// can pin the time with [`FixedClock`].
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds.
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_unix_millis()
    }
}

/// Clock that always returns the same instant. Test use only.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    millis: i64,
}

impl FixedClock {
    /// Pin the clock to the given Unix millisecond timestamp.
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis
    }
}

/// Current Unix timestamp in milliseconds.
pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as RFC 3339 in JST.
pub fn format_jst_rfc3339(millis: i64) -> String {
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS).unwrap();
    let secs = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    jst.timestamp_opt(secs, nanos).unwrap().to_rfc3339()
}
