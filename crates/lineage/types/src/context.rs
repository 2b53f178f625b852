use crate::Principal;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Per-call context supplied by the substrate: who is calling, and when the
/// call is sequenced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub at: DateTime<Utc>,
}

impl CallContext {
    pub fn new(caller: Principal, at: DateTime<Utc>) -> Self {
        Self { caller, at }
    }

    /// Context stamped with the wall clock.
    pub fn now(caller: Principal) -> Self {
        Self::new(caller, Utc::now())
    }
}

/// Source of substrate time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic replay and tests.
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }
}
