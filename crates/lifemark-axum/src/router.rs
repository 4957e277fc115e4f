//! Demo application routes.
//!
//! `GET /` answers `{"hello":"world"}`; `POST /echo` returns its JSON body.

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{extract::TimedJson, handle::TimingHandle, plugin::LifecyclePlugin};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoBody {
    pub message: String,
}

pub fn build_router(plugin: &LifecyclePlugin) -> Router {
    let app = Router::new()
        .route("/", get(hello))
        .route("/echo", post(echo));
    plugin.register(app)
}

async fn hello(timing: TimingHandle) -> Response {
    timing.enter_handler();
    timing.json(&json!({ "hello": "world" }))
}

async fn echo(timing: TimingHandle, TimedJson(body): TimedJson<EchoBody>) -> Response {
    timing.json(&body)
}
