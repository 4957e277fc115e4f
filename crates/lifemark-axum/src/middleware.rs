//! Lifecycle middleware: the outer hook points.
//!
//! - `request-received` on entry, `pre-parse` when the request is handed to
//!   the route (extraction starts there).
//! - `pre-send` when the inner service hands back the response.
//! - `response-complete` from the response body, see [`crate::body`], or at
//!   hand-off for responses that carry no body.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use lifemark_core::LifecycleEvent;

use crate::body::{Completion, CompletionBody};
use crate::handle::TimingHandle;
use crate::observer::RequestMeta;
use crate::plugin::LifecyclePlugin;

pub async fn track_lifecycle(State(plugin): State<LifecyclePlugin>, mut req: Request, next: Next) -> Response {
    // host-side clock for the authoritative total
    let started = Instant::now();

    let handle = TimingHandle::new(plugin);
    handle.mark(LifecycleEvent::RequestReceived);

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(handle.clone());

    handle.mark(LifecycleEvent::PreParse);
    let response = next.run(req).await;
    handle.mark(LifecycleEvent::PreSend);

    let (mut parts, body) = response.into_parts();
    parts.extensions.insert(handle.clone());

    let bodiless = is_bodiless(&method, parts.status);
    let meta = RequestMeta { method, path, status: parts.status };
    let completion = Completion::new(handle, started, meta);

    // The server sends these without polling the body, so completion is the
    // hand-off itself.
    if bodiless {
        completion.fire();
        return Response::from_parts(parts, body);
    }

    let body = CompletionBody::new(body, completion);
    Response::from_parts(parts, Body::new(body))
}

/// HEAD, 1xx, 204 and 304 responses never carry a body on the wire.
fn is_bodiless(method: &Method, status: StatusCode) -> bool {
    *method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}
