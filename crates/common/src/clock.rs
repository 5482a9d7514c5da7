//! Time source for record timestamps.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// Source of "now" for every persisted timestamp.
///
/// Timestamps are truncated to whole milliseconds so that the value read back
/// from storage compares equal to the value used in pagination cursors.
pub trait Clock: Send + Sync + Debug {
    /// Current instant in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Current instant as a UTC timestamp.
    fn now(&self) -> DateTime<FixedOffset> {
        from_millis(self.now_millis())
    }
}

/// Shared clock handle passed into services.
pub type SharedClock = Arc<dyn Clock>;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to. Every read advances it by `step`
/// milliseconds, giving each record a distinct, increasing timestamp.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// Start at `start_millis`, advancing `step` ms per read.
    #[must_use]
    pub const fn new(start_millis: i64, step: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
            step,
        }
    }

    /// Jump forward without producing a timestamp.
    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // 2025-01-01T00:00:00Z
        Self::new(1_735_689_600_000, 1)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.fetch_add(self.step, Ordering::SeqCst)
    }
}

/// Convert epoch milliseconds into the stored timestamp representation.
#[must_use]
pub fn from_millis(millis: i64) -> DateTime<FixedOffset> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::new(1_000, 10);
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_010);
        clock.advance(100);
        assert_eq!(clock.now_millis(), 1_120);
    }

    #[test]
    fn test_system_clock_is_millisecond_precise() {
        let now = SystemClock.now();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_from_millis_round_trips() {
        let ts = from_millis(1_735_689_600_123);
        assert_eq!(ts.timestamp_millis(), 1_735_689_600_123);
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }
}
