use std::sync::atomic::{AtomicI64, Ordering};

use crate::shared::core::primitives::{Clock, EpochMillis};

/// Clock that only moves when a test moves it.
#[derive(Debug)]
pub struct ManualClock {
    origin: EpochMillis,
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(origin: EpochMillis) -> Self {
        Self {
            origin,
            now: AtomicI64::new(origin),
        }
    }

    pub fn set(&self, at: EpochMillis) {
        self.now.store(at, Ordering::SeqCst);
    }

    /// Seconds past the origin the clock was created at.
    pub fn set_secs(&self, seconds: i64) {
        self.set(self.origin + seconds * 1000);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}
