//! lifemark core: host-agnostic request lifecycle timing.
//!
//! This crate owns the timing-mark bookkeeping and the derivation of phase
//! durations from the fixed, ordered set of lifecycle events. It carries no
//! web framework or runtime dependencies; hosts attach a [`RequestTiming`]
//! slot to their own request type through [`TimingStore`] and call the
//! [`LifecycleTimer`] from their hook points.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Observation must
//! never bring down the request it observes, so every fallible path surfaces
//! as `LifemarkError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod error;
pub mod event;
pub mod marks;
pub mod measurement;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{ErrorCode, LifemarkError};
/// Shared result type.
pub use error::Result;
pub use event::LifecycleEvent;
pub use marks::TimingMarks;
pub use measurement::{PerformanceMeasurement, Phase};
pub use timer::{LifecycleTimer, RequestTiming, TimingStore};
