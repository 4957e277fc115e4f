//! Consumers of finished measurements.
//!
//! Observers run synchronously when the response body completes, so they
//! should only hand the data off (log it, push it to a channel).

use axum::http::{Method, StatusCode};
use lifemark_core::PerformanceMeasurement;

/// Request metadata delivered alongside the measurement.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
}

pub trait MeasurementObserver: Send + Sync {
    fn on_measurement(&self, meta: &RequestMeta, measurement: &PerformanceMeasurement);
}

impl<F> MeasurementObserver for F
where
    F: Fn(&RequestMeta, &PerformanceMeasurement) + Send + Sync,
{
    fn on_measurement(&self, meta: &RequestMeta, measurement: &PerformanceMeasurement) {
        self(meta, measurement)
    }
}

/// Emits one `info` event per measured request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MeasurementObserver for TracingObserver {
    fn on_measurement(&self, meta: &RequestMeta, m: &PerformanceMeasurement) {
        tracing::info!(
            method = %meta.method,
            path = %meta.path,
            status = meta.status.as_u16(),
            parsing_ms = ?m.parsing_time_ms(),
            validation_ms = ?m.validation_time_ms(),
            handler_ms = ?m.handler_time_ms(),
            serialization_ms = ?m.serialization_time_ms(),
            total_ms = ?m.total_time_ms(),
            "request performance"
        );
    }
}
