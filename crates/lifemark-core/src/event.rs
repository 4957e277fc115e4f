//! Lifecycle event names.
//!
//! The seven events form a fixed, totally ordered sequence. The order is a
//! constant of the system and is never discovered at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LifemarkError;

/// A named phase boundary in a request's processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    /// Request accepted by the host.
    RequestReceived,
    /// Body parsing is about to start.
    PreParse,
    /// Parsed request is about to be validated.
    PreValidate,
    /// Validated request is about to reach the handler.
    PreHandle,
    /// Handler output is about to be serialized.
    PreSerialize,
    /// Serialized response is about to be sent.
    PreSend,
    /// Response fully sent.
    ResponseComplete,
}

impl LifecycleEvent {
    /// All events, in dispatch order.
    pub const ALL: [LifecycleEvent; 7] = [
        LifecycleEvent::RequestReceived,
        LifecycleEvent::PreParse,
        LifecycleEvent::PreValidate,
        LifecycleEvent::PreHandle,
        LifecycleEvent::PreSerialize,
        LifecycleEvent::PreSend,
        LifecycleEvent::ResponseComplete,
    ];

    /// Number of events.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in [`LifecycleEvent::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable kebab-case name (config files, logs).
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::RequestReceived => "request-received",
            LifecycleEvent::PreParse => "pre-parse",
            LifecycleEvent::PreValidate => "pre-validate",
            LifecycleEvent::PreHandle => "pre-handle",
            LifecycleEvent::PreSerialize => "pre-serialize",
            LifecycleEvent::PreSend => "pre-send",
            LifecycleEvent::ResponseComplete => "response-complete",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = LifemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| LifemarkError::UnknownEvent(s.to_string()))
    }
}
