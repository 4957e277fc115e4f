//! Monotonic time sources for timing marks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic clock reporting milliseconds since an arbitrary epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// `Instant`-backed clock; the epoch is the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for deterministic timing (tests, replays).
///
/// Stores the `f64` bit pattern in an atomic so it can be advanced through a
/// shared reference while a timer holds it.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { bits: AtomicU64::new(start_ms.to_bits()) }
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: f64) {
        self.bits.store(ms.to_bits(), Ordering::Relaxed);
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}
