//! Wall-clock seam.
//!
//! Staking accrual and router deadlines both read the current time; routing
//! that read through a trait keeps the engines deterministic under test,
//! with [`ManualClock`] standing in for wall-clock time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current unix timestamp, in whole seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-1970 system time only happens on a misconfigured host; clamp
        // rather than wrap.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Deterministic clock for tests. Cloning shares the underlying instant, so a
/// router and a staking ledger can observe the same advancing time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
