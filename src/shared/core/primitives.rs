// Primitives shared by every module.
//
// Timestamps
// - All i64 instants are epoch milliseconds. Durations derived from them are whole seconds.

use chrono::Utc;
use uuid::Uuid;

pub type EpochMillis = i64;

/// Source of "now" for the domain. Handlers never read the system time directly.
pub trait Clock: Send + Sync {
    fn now(&self) -> EpochMillis;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        Utc::now().timestamp_millis()
    }
}

/// Whole seconds elapsed between two instants, floored.
pub fn seconds_between(from: EpochMillis, to: EpochMillis) -> i64 {
    (to - from).div_euclid(1000)
}

pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}
