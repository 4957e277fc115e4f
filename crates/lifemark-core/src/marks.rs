//! Per-request timing marks.

use crate::event::LifecycleEvent;

/// Sparse map from lifecycle event to a monotonic timestamp (ms).
///
/// A slot is filled only when that phase actually occurred. Recording the
/// same event twice keeps the latest timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingMarks {
    slots: [Option<f64>; LifecycleEvent::COUNT],
}

impl TimingMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the timestamp for `event`.
    pub fn record(&mut self, event: LifecycleEvent, timestamp_ms: f64) {
        self.slots[event.index()] = Some(timestamp_ms);
    }

    pub fn get(&self, event: LifecycleEvent) -> Option<f64> {
        self.slots[event.index()]
    }

    pub fn contains(&self, event: LifecycleEvent) -> bool {
        self.get(event).is_some()
    }

    /// `end - start`, or `None` if either mark is missing.
    ///
    /// Presence decides, not value: a mark taken at `0.0` is a real mark.
    pub fn between(&self, start: LifecycleEvent, end: LifecycleEvent) -> Option<f64> {
        Some(self.get(end)? - self.get(start)?)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Present marks, in event order.
    pub fn iter(&self) -> impl Iterator<Item = (LifecycleEvent, f64)> + '_ {
        LifecycleEvent::ALL
            .into_iter()
            .filter_map(move |e| self.get(e).map(|ts| (e, ts)))
    }
}
