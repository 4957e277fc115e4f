//! Per-request timing handle.
//!
//! axum moves the request through the middleware, the extractors and the
//! handler, and the measurement is only finished once the response body has
//! been drained. The handle is the one place all of them reach: a
//! `RequestTiming` slot owned by this request alone, cloned into the request
//! and response extensions and dropped with them.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use lifemark_core::error::Result;
use lifemark_core::{LifecycleEvent, PerformanceMeasurement, RequestTiming, TimingMarks};

use crate::plugin::LifecyclePlugin;

#[derive(Clone)]
pub struct TimingHandle {
    plugin: Option<LifecyclePlugin>,
    slot: Arc<Mutex<RequestTiming>>,
}

impl TimingHandle {
    pub(crate) fn new(plugin: LifecyclePlugin) -> Self {
        Self {
            plugin: Some(plugin),
            slot: Arc::new(Mutex::new(RequestTiming::new())),
        }
    }

    /// Handle that records nothing (plugin not registered on this route).
    pub fn detached() -> Self {
        Self {
            plugin: None,
            slot: Arc::new(Mutex::new(RequestTiming::new())),
        }
    }

    /// Record `event` now, if the plugin supports it.
    pub fn mark(&self, event: LifecycleEvent) {
        let Some(plugin) = &self.plugin else { return };
        if !plugin.is_enabled(event) {
            return;
        }
        // Poisoned slot: skip the mark rather than disturb the request.
        if let Ok(mut slot) = self.slot.lock() {
            plugin.timer().mark(&mut *slot, event);
        }
    }

    fn mark_if_absent(&self, event: LifecycleEvent) {
        let seen = self
            .marks()
            .map(|m| m.contains(event))
            .unwrap_or(false);
        if !seen {
            self.mark(event);
        }
    }

    /// For handlers that take no body: the request goes straight from
    /// parsing to the handler. Already-recorded marks are kept.
    pub fn enter_handler(&self) {
        self.mark_if_absent(LifecycleEvent::PreValidate);
        self.mark_if_absent(LifecycleEvent::PreHandle);
    }

    /// Serialize `value` as the JSON response, marking `pre-serialize`.
    pub fn json<T: Serialize>(&self, value: &T) -> Response {
        self.mark(LifecycleEvent::PreSerialize);
        match serde_json::to_vec(value) {
            Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "response serialization failed");
                let body = json!({ "error": { "code": "INTERNAL", "msg": "serialization failed" } });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
            }
        }
    }

    /// Marks recorded so far.
    pub fn marks(&self) -> Option<TimingMarks> {
        let slot = self.slot.lock().ok()?;
        slot.marks().cloned()
    }

    /// The finalized measurement, or `None` while the response is in flight.
    pub fn read(&self) -> Option<PerformanceMeasurement> {
        let plugin = self.plugin.as_ref()?;
        let slot = self.slot.lock().ok()?;
        plugin.timer().read(&*slot).cloned()
    }

    /// Returns `None` for detached handles.
    pub(crate) fn finalize(&self, total_ms: f64) -> Option<Result<PerformanceMeasurement>> {
        let plugin = self.plugin.as_ref()?;
        let mut slot = self.slot.lock().ok()?;
        Some(plugin.timer().finalize(&mut *slot, total_ms).cloned())
    }

    pub(crate) fn plugin(&self) -> Option<&LifecyclePlugin> {
        self.plugin.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TimingHandle
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TimingHandle>()
            .cloned()
            .unwrap_or_else(TimingHandle::detached))
    }
}
