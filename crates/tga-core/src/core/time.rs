// tga-core/src/core/time.rs
// ============================================================================
// Module: Injected Clock
// Description: Time source abstraction consumed by the validator and runtime.
// Purpose: Keep wall-clock reads at the edge so tests stay deterministic.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time directly; every operation that needs
//! "now" takes a `&dyn Clock`. Hosts wire in [`SystemClock`] at the edge;
//! tests wire in [`FixedClock`].

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use time::OffsetDateTime;
use time::macros::format_description;

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, exactly three subsecond digits.
const ISO8601_MILLIS_FORMAT: &[time::format_description::FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Supplies the current time to time-sensitive operations.
pub trait Clock: Send + Sync {
    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_unix_millis(&self) -> i64;

    /// Returns the current time as an ISO-8601 UTC timestamp with
    /// millisecond precision and a `Z` suffix.
    fn now_iso8601(&self) -> String {
        format_iso8601_millis(self.now_unix_millis())
    }
}

/// Formats a Unix millisecond timestamp as `YYYY-MM-DDTHH:MM:SS.sssZ`.
#[must_use]
pub fn format_iso8601_millis(unix_millis: i64) -> String {
    let clamped_millis = i128::from(unix_millis.max(0));
    let datetime = OffsetDateTime::from_unix_timestamp_nanos(clamped_millis * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    datetime
        .format(ISO8601_MILLIS_FORMAT)
        .unwrap_or_else(|_| "1970-01-01T00:00:00.000Z".to_string())
}

/// Reads the current time from the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_millis(&self) -> i64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Returns a fixed instant regardless of how much wall-clock time passes,
/// for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    unix_millis: i64,
}

impl FixedClock {
    /// Creates a clock fixed at `unix_millis`.
    #[must_use]
    pub const fn new(unix_millis: i64) -> Self {
        Self { unix_millis }
    }

    /// Returns a copy of this clock advanced by `delta_millis`.
    #[must_use]
    pub const fn advanced_by(self, delta_millis: i64) -> Self {
        Self {
            unix_millis: self.unix_millis + delta_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_unix_millis(&self) -> i64 {
        self.unix_millis
    }
}
