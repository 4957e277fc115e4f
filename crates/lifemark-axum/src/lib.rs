//! lifemark axum integration.
//!
//! Wires the core [`LifecycleTimer`](lifemark_core::LifecycleTimer) into an
//! axum application: a middleware for the outer events, extractors and a
//! response helper for the inner ones, and a completion-aware response body
//! that finalizes the measurement once the last byte has been handed off.
//! The plugin only observes; it never changes the response.

pub mod body;
pub mod config;
pub mod extract;
pub mod handle;
pub mod middleware;
pub mod observer;
pub mod plugin;
pub mod router;

pub use extract::{TimedJson, TimedJsonRejection};
pub use handle::TimingHandle;
pub use observer::{MeasurementObserver, RequestMeta, TracingObserver};
pub use plugin::LifecyclePlugin;
