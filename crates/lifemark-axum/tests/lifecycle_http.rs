//! End-to-end: the plugin registered on an axum router, driven in-process.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceExt;

use lifemark_axum::config::PluginSection;
use lifemark_axum::{LifecyclePlugin, RequestMeta, TimedJson, TimingHandle};
use lifemark_core::{LifecycleEvent, PerformanceMeasurement, Phase};

type Captured = Arc<Mutex<Vec<(RequestMeta, PerformanceMeasurement)>>>;

#[derive(Debug, Serialize, Deserialize)]
struct Order {
    sku: String,
    qty: u32,
}

async fn slow_hello(timing: TimingHandle) -> Response {
    timing.enter_handler();
    tokio::time::sleep(Duration::from_millis(50)).await;
    timing.json(&json!({ "hello": "world" }))
}

async fn create_order(timing: TimingHandle, TimedJson(order): TimedJson<Order>) -> Response {
    timing.json(&order)
}

async fn plain() -> &'static str {
    "plain"
}

async fn no_content(timing: TimingHandle) -> StatusCode {
    timing.enter_handler();
    StatusCode::NO_CONTENT
}

fn section(events: &[LifecycleEvent]) -> PluginSection {
    PluginSection { events: events.to_vec(), log_measurements: false }
}

fn app_with(cfg: PluginSection) -> (Router, Captured) {
    let captured: Captured = Arc::default();
    let sink = Arc::clone(&captured);
    let plugin = LifecyclePlugin::new(&cfg)
        .unwrap()
        .with_observer(Arc::new(move |meta: &RequestMeta, m: &PerformanceMeasurement| {
            sink.lock().unwrap().push((meta.clone(), m.clone()));
        }));

    let router = Router::new()
        .route("/", get(slow_hello))
        .route("/orders", post(create_order))
        .route("/plain", get(plain))
        .route("/orders/latest", delete(no_content));
    (plugin.register(router), captured)
}

fn app() -> (Router, Captured) {
    app_with(section(&LifecycleEvent::ALL))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String, Option<TimingHandle>) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let handle = res.extensions().get::<TimingHandle>().cloned();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap(), handle)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn does_not_break_request_handling() {
    let (app, _) = app();
    let (status, body, _) = send(app, get_req("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"hello":"world"}"#);
}

#[tokio::test]
async fn measures_every_phase() {
    let (app, captured) = app();
    send(app, get_req("/")).await;

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let (meta, m) = &captured[0];
    assert_eq!(meta.method, Method::GET);
    assert_eq!(meta.path, "/");
    assert_eq!(meta.status, StatusCode::OK);

    for phase in Phase::ALL {
        let v = m.phase(phase).unwrap_or_else(|| panic!("{} missing", phase.as_str()));
        assert!(v >= 0.0);
    }
}

#[tokio::test]
async fn measures_timing_accurately() {
    let (app, captured) = app();
    send(app, get_req("/")).await;

    let m = captured.lock().unwrap()[0].1.clone();
    let total = m.total_time_ms().unwrap();
    assert!(total >= 50.0, "total {total}");
    assert!(m.handler_time_ms().unwrap() >= 50.0);
    assert!((m.phase_sum_ms() - total).abs() < 5.0, "sum {} total {total}", m.phase_sum_ms());
}

#[tokio::test]
async fn measurement_readable_from_response_handle() {
    let (app, _) = app();
    let res = app.oneshot(get_req("/")).await.unwrap();
    let handle = res.extensions().get::<TimingHandle>().cloned().unwrap();
    assert!(handle.read().is_none(), "body not sent yet");

    res.into_body().collect().await.unwrap();
    let m = handle.read().expect("finalized after body completes");
    assert!(m.total_time_ms().unwrap() > 0.0);
    assert!(handle.marks().unwrap().contains(LifecycleEvent::ResponseComplete));
}

#[tokio::test]
async fn json_body_marks_parse_and_validate() {
    let (app, captured) = app();
    let (status, body, _) = send(app, post_json("/orders", r#"{"sku":"A-1","qty":2}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"sku":"A-1","qty":2}"#);

    let m = captured.lock().unwrap()[0].1.clone();
    assert!(m.parsing_time_ms().is_some());
    assert!(m.validation_time_ms().is_some());
    assert!(m.handler_time_ms().is_some());
    assert!(m.serialization_time_ms().is_some());
}

#[tokio::test]
async fn validation_failure_short_circuits() {
    let (app, captured) = app();
    let (status, body, _) = send(app, post_json("/orders", r#"{"sku":"A-1"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("BAD_REQUEST"));

    let captured = captured.lock().unwrap();
    let (meta, m) = &captured[0];
    assert_eq!(meta.status, StatusCode::BAD_REQUEST);
    assert!(m.parsing_time_ms().is_some());
    assert_eq!(m.validation_time_ms(), None);
    assert_eq!(m.handler_time_ms(), None);
    assert_eq!(m.serialization_time_ms(), None);
    assert!(m.total_time_ms().is_some());
}

#[tokio::test]
async fn malformed_json_reaches_no_phase() {
    let (app, captured) = app();
    let (status, _, _) = send(app, post_json("/orders", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let m = captured.lock().unwrap()[0].1.clone();
    assert_eq!(m.phase_sum_ms(), 0.0);
    assert!(m.total_time_ms().is_some());
}

#[tokio::test]
async fn handlers_without_hooks_get_total_only() {
    let (app, captured) = app();
    let (status, body, _) = send(app, get_req("/plain")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "plain");

    let m = captured.lock().unwrap()[0].1.clone();
    assert_eq!(m.parsing_time_ms(), None);
    assert_eq!(m.handler_time_ms(), None);
    assert!(m.total_time_ms().is_some());
}

#[tokio::test]
async fn unsupported_events_are_not_marked() {
    use LifecycleEvent::*;
    let (app, captured) = app_with(section(&[PreHandle, PreSerialize, PreSend, ResponseComplete]));
    send(app, get_req("/")).await;

    let m = captured.lock().unwrap()[0].1.clone();
    assert_eq!(m.parsing_time_ms(), None);
    assert_eq!(m.validation_time_ms(), None);
    assert!(m.handler_time_ms().unwrap() >= 50.0);
    assert!(m.serialization_time_ms().is_some());
}

#[tokio::test]
async fn dropped_body_leaves_measurement_absent() {
    let (app, captured) = app();
    let res = app.oneshot(get_req("/")).await.unwrap();
    let handle = res.extensions().get::<TimingHandle>().cloned().unwrap();
    drop(res);

    assert!(handle.read().is_none());
    assert!(captured.lock().unwrap().is_empty());
    assert!(!handle.marks().unwrap().contains(LifecycleEvent::ResponseComplete));
}

#[tokio::test]
async fn concurrent_requests_are_isolated() {
    let (app, captured) = app();
    let (a, b) = tokio::join!(
        send(app.clone(), get_req("/")),
        send(app, post_json("/orders", r#"{"sku":"B-2","qty":1}"#)),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 2);
    let slow = captured.iter().find(|(meta, _)| meta.path == "/").unwrap();
    let fast = captured.iter().find(|(meta, _)| meta.path == "/orders").unwrap();
    assert!(slow.1.handler_time_ms().unwrap() >= 50.0);
    assert!(fast.1.handler_time_ms().unwrap() < 50.0);
}

#[tokio::test]
async fn unregistered_router_still_serves() {
    let router = Router::new().route("/", get(slow_hello));
    let (status, body, handle) = send(router, get_req("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"hello":"world"}"#);
    assert!(handle.is_none());
}

#[tokio::test]
async fn head_request_is_measured() {
    let (app, captured) = app();
    let req = Request::builder().method(Method::HEAD).uri("/").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let handle = res.extensions().get::<TimingHandle>().cloned().unwrap();
    // the server never polls a HEAD body
    drop(res);

    assert!(handle.read().is_some());
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0.method, Method::HEAD);
    assert!(captured[0].1.handler_time_ms().unwrap() >= 50.0);
}

#[tokio::test]
async fn no_content_response_is_measured() {
    let (app, captured) = app();
    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/orders/latest")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    drop(res);

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0.status, StatusCode::NO_CONTENT);
    assert!(captured[0].1.total_time_ms().is_some());
}
