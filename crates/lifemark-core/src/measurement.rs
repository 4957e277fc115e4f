//! Performance measurement derived from timing marks.
//!
//! A measurement is built once through a crate-private [`MeasurementDraft`]
//! and then frozen; callers only ever see read-only accessors.

use serde::Serialize;

use crate::event::LifecycleEvent;
use crate::marks::TimingMarks;

/// Measured phase of the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Parsing,
    Validation,
    Handler,
    Serialization,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Parsing, Phase::Validation, Phase::Handler, Phase::Serialization];

    /// The (start, end) marks bounding this phase.
    pub fn bounds(self) -> (LifecycleEvent, LifecycleEvent) {
        use LifecycleEvent::*;
        match self {
            Phase::Parsing => (PreParse, PreValidate),
            Phase::Validation => (PreValidate, PreHandle),
            Phase::Handler => (PreHandle, PreSerialize),
            Phase::Serialization => (PreSerialize, PreSend),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Parsing => "parsing",
            Phase::Validation => "validation",
            Phase::Handler => "handler",
            Phase::Serialization => "serialization",
        }
    }
}

/// Durations (ms) for one completed request. Absent fields mean the phase
/// did not occur, never that it took zero time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMeasurement {
    #[serde(skip_serializing_if = "Option::is_none")]
    parsing_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handler_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    serialization_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_time_ms: Option<f64>,
}

impl PerformanceMeasurement {
    pub fn parsing_time_ms(&self) -> Option<f64> {
        self.parsing_time_ms
    }

    pub fn validation_time_ms(&self) -> Option<f64> {
        self.validation_time_ms
    }

    pub fn handler_time_ms(&self) -> Option<f64> {
        self.handler_time_ms
    }

    pub fn serialization_time_ms(&self) -> Option<f64> {
        self.serialization_time_ms
    }

    /// Host-reported end-to-end duration.
    pub fn total_time_ms(&self) -> Option<f64> {
        self.total_time_ms
    }

    /// Duration of a single phase.
    pub fn phase(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Parsing => self.parsing_time_ms,
            Phase::Validation => self.validation_time_ms,
            Phase::Handler => self.handler_time_ms,
            Phase::Serialization => self.serialization_time_ms,
        }
    }

    /// Sum of the phases that are present.
    pub fn phase_sum_ms(&self) -> f64 {
        Phase::ALL.into_iter().filter_map(|p| self.phase(p)).sum()
    }
}

/// Mutable scratch record used while finalizing.
#[derive(Debug, Default)]
pub(crate) struct MeasurementDraft {
    parsing_time_ms: Option<f64>,
    validation_time_ms: Option<f64>,
    handler_time_ms: Option<f64>,
    serialization_time_ms: Option<f64>,
    total_time_ms: Option<f64>,
}

impl MeasurementDraft {
    /// Fill every phase from `marks`.
    pub(crate) fn from_marks(marks: &TimingMarks) -> Self {
        let mut draft = Self::default();
        for phase in Phase::ALL {
            let (start, end) = phase.bounds();
            let value = match marks.between(start, end) {
                Some(d) if d >= 0.0 => Some(d),
                Some(d) => {
                    tracing::trace!(phase = phase.as_str(), delta_ms = d, "marks out of order; phase dropped");
                    None
                }
                None => None,
            };
            draft.set_phase(phase, value);
        }
        draft
    }

    fn set_phase(&mut self, phase: Phase, value: Option<f64>) {
        match phase {
            Phase::Parsing => self.parsing_time_ms = value,
            Phase::Validation => self.validation_time_ms = value,
            Phase::Handler => self.handler_time_ms = value,
            Phase::Serialization => self.serialization_time_ms = value,
        }
    }

    pub(crate) fn total(mut self, total_ms: f64) -> Self {
        self.total_time_ms = Some(total_ms);
        self
    }

    pub(crate) fn freeze(self) -> PerformanceMeasurement {
        PerformanceMeasurement {
            parsing_time_ms: self.parsing_time_ms,
            validation_time_ms: self.validation_time_ms,
            handler_time_ms: self.handler_time_ms,
            serialization_time_ms: self.serialization_time_ms,
            total_time_ms: self.total_time_ms,
        }
    }
}
