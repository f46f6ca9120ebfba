//! Time source collaborator, kept separate from `SystemTime::now()` so refresh and expiration
//! logic can be driven deterministically in tests.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// Supplies the current time to providers.
///
/// Grounded in the `TimeSource` trait used by `smithy-rs`'s lazy-caching credentials provider:
/// production code uses [`SystemClock`], tests substitute [`TestClock`] to advance time without
/// sleeping.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Default [`Clock`] backed by the real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    /// Create a test clock starting at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        TestClock {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Advance (or rewind) the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("lock poisoned") = now;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("lock poisoned")
    }
}
