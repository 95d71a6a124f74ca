//! Clock Abstraction
//!
//! Time is injected so that expiry logic is testable. There is no
//! background sweeper: OTP and reset expiries are compared against the
//! injected clock lazily, at verification time.

use chrono::{DateTime, Utc};

/// Source of the current time for all expiry checks.
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
