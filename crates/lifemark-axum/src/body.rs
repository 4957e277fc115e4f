//! Completion-aware response body.
//!
//! Wraps the response body and fires the completion exactly once, when the
//! body reports end-of-stream. A body dropped before that point (client
//! went away, stream error) counts as an aborted request: no
//! `response-complete` mark and no measurement.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use tokio::time::Instant;

use lifemark_core::LifecycleEvent;

use crate::handle::TimingHandle;
use crate::observer::RequestMeta;

/// Everything needed to finish one request's measurement.
pub struct Completion {
    handle: TimingHandle,
    started: Instant,
    meta: RequestMeta,
}

impl Completion {
    pub fn new(handle: TimingHandle, started: Instant, meta: RequestMeta) -> Self {
        Self { handle, started, meta }
    }

    pub(crate) fn fire(self) {
        let total_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.handle.mark(LifecycleEvent::ResponseComplete);

        match self.handle.finalize(total_ms) {
            Some(Ok(measurement)) => {
                if let Some(plugin) = self.handle.plugin() {
                    plugin.notify(&self.meta, &measurement);
                }
            }
            Some(Err(e)) => {
                tracing::warn!(
                    code = e.code().as_str(),
                    error = %e,
                    path = %self.meta.path,
                    "lifecycle measurement rejected"
                );
            }
            None => {}
        }
    }
}

pub struct CompletionBody {
    inner: Body,
    completion: Option<Completion>,
}

impl CompletionBody {
    pub fn new(inner: Body, completion: Completion) -> Self {
        Self { inner, completion: Some(completion) }
    }

    fn complete(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.fire();
        }
    }

    fn abort(&mut self, reason: &'static str) {
        if let Some(completion) = self.completion.take() {
            tracing::debug!(path = %completion.meta.path, reason, "response not completed; measurement skipped");
        }
    }
}

impl HttpBody for CompletionBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(None) => this.complete(),
            Poll::Ready(Some(Err(_))) => this.abort("body stream error"),
            _ => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for CompletionBody {
    fn drop(&mut self) {
        // The server may stop polling once `is_end_stream` turns true.
        if self.inner.is_end_stream() {
            self.complete();
        } else {
            self.abort("body dropped early");
        }
    }
}
