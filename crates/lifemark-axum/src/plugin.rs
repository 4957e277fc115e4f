//! Plugin registration.
//!
//! Build once at startup from the `plugin` config section, attach observers,
//! then `register` onto the application router. The plugin is cheap to
//! clone and shared by every request.

use std::sync::Arc;

use axum::{middleware as axum_middleware, Router};
use lifemark_core::error::Result;
use lifemark_core::{LifecycleEvent, LifecycleTimer, PerformanceMeasurement};

use crate::config::PluginSection;
use crate::middleware::track_lifecycle;
use crate::observer::{MeasurementObserver, RequestMeta, TracingObserver};

#[derive(Clone)]
pub struct LifecyclePlugin {
    inner: Arc<PluginInner>,
}

#[derive(Clone)]
struct PluginInner {
    timer: LifecycleTimer,
    enabled: [bool; LifecycleEvent::COUNT],
    observers: Vec<Arc<dyn MeasurementObserver>>,
}

impl LifecyclePlugin {
    /// Validate the supported events and build the plugin.
    pub fn new(cfg: &PluginSection) -> Result<Self> {
        cfg.validate()?;

        let mut enabled = [false; LifecycleEvent::COUNT];
        for event in &cfg.events {
            enabled[event.index()] = true;
        }

        let mut observers: Vec<Arc<dyn MeasurementObserver>> = Vec::new();
        if cfg.log_measurements {
            observers.push(Arc::new(TracingObserver));
        }

        Ok(Self {
            inner: Arc::new(PluginInner {
                timer: LifecycleTimer::new(),
                enabled,
                observers,
            }),
        })
    }

    /// Add an observer notified after every completed request.
    pub fn with_observer(mut self, observer: Arc<dyn MeasurementObserver>) -> Self {
        Arc::make_mut(&mut self.inner).observers.push(observer);
        self
    }

    /// Attach the lifecycle middleware to `router`.
    ///
    /// Routes added after this call are not instrumented.
    pub fn register<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(axum_middleware::from_fn_with_state(self.clone(), track_lifecycle))
    }

    pub fn is_enabled(&self, event: LifecycleEvent) -> bool {
        self.inner.enabled[event.index()]
    }

    pub fn timer(&self) -> &LifecycleTimer {
        &self.inner.timer
    }

    pub(crate) fn notify(&self, meta: &RequestMeta, measurement: &PerformanceMeasurement) {
        for observer in &self.inner.observers {
            observer.on_measurement(meta, measurement);
        }
    }
}
