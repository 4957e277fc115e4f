//! The lifecycle timer: `mark`, `finalize`, `read`.
//!
//! State lives on the request (a [`RequestTiming`] slot reached through
//! [`TimingStore`]); the timer only owns its clock and is shared by every
//! request without locking.
//!
//! Caller obligation: hooks for one request must not overlap. Operations take
//! `&mut` access to the slot, so a host that shares a request across tasks
//! has to provide its own exclusion.

use crate::clock::{Clock, MonotonicClock};
use crate::error::{LifemarkError, Result};
use crate::event::LifecycleEvent;
use crate::marks::TimingMarks;
use crate::measurement::{MeasurementDraft, PerformanceMeasurement};

/// Per-request storage for marks and the finalized measurement.
#[derive(Debug, Clone, Default)]
pub struct RequestTiming {
    marks: Option<TimingMarks>,
    measurement: Option<PerformanceMeasurement>,
}

impl RequestTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks recorded so far (`None` before the first mark).
    pub fn marks(&self) -> Option<&TimingMarks> {
        self.marks.as_ref()
    }

    pub fn measurement(&self) -> Option<&PerformanceMeasurement> {
        self.measurement.as_ref()
    }
}

/// Access to the timing slot attached to a host's request object.
pub trait TimingStore {
    /// The slot, if one was ever attached.
    fn timing(&self) -> Option<&RequestTiming>;
    /// The slot, attaching an empty one if absent.
    fn timing_mut(&mut self) -> &mut RequestTiming;
}

impl TimingStore for RequestTiming {
    fn timing(&self) -> Option<&RequestTiming> {
        Some(self)
    }

    fn timing_mut(&mut self) -> &mut RequestTiming {
        self
    }
}

/// Records lifecycle marks and derives the performance measurement.
#[derive(Debug, Clone, Default)]
pub struct LifecycleTimer<C = MonotonicClock> {
    clock: C,
}

impl LifecycleTimer<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<C: Clock> LifecycleTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Record "now" under `event`, overwriting any earlier mark for it.
    pub fn mark<S: TimingStore + ?Sized>(&self, request: &mut S, event: LifecycleEvent) {
        let now = self.clock.now_ms();
        self.mark_at(request, event, now);
    }

    /// Record an explicit timestamp under `event`.
    pub fn mark_at<S: TimingStore + ?Sized>(&self, request: &mut S, event: LifecycleEvent, timestamp_ms: f64) {
        request
            .timing_mut()
            .marks
            .get_or_insert_with(TimingMarks::new)
            .record(event, timestamp_ms);
    }

    /// Derive and store the measurement. `total_ms` is the host's own
    /// elapsed time for the request and must be positive: zero means the
    /// response has not been sent yet.
    ///
    /// A second call replaces the earlier measurement.
    pub fn finalize<'a, S: TimingStore + ?Sized>(
        &self,
        request: &'a mut S,
        total_ms: f64,
    ) -> Result<&'a PerformanceMeasurement> {
        if total_ms == 0.0 {
            return Err(LifemarkError::ResponseNotSent);
        }
        if !total_ms.is_finite() || total_ms < 0.0 {
            return Err(LifemarkError::InvalidTotal(total_ms));
        }

        let slot = request.timing_mut();
        let draft = match &slot.marks {
            Some(marks) => MeasurementDraft::from_marks(marks),
            None => MeasurementDraft::default(),
        };

        if slot.measurement.is_some() {
            tracing::debug!(total_ms, "request finalized twice; replacing measurement");
        }

        let stored = slot.measurement.insert(draft.total(total_ms).freeze());
        Ok(&*stored)
    }

    /// The stored measurement, or `None` if `finalize` has not run.
    pub fn read<'a, S: TimingStore + ?Sized>(&self, request: &'a S) -> Option<&'a PerformanceMeasurement> {
        request.timing()?.measurement.as_ref()
    }
}
