//! JSON body extractor with parse/validate hook points.
//!
//! Parsing reads the body and builds a JSON document; validation binds that
//! document to the handler's type. `pre-validate` is marked between the two
//! and `pre-handle` once the typed value is ready. Without a registered
//! plugin the extractor behaves like a plain JSON extractor.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use lifemark_core::LifecycleEvent;

use crate::handle::TimingHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimedJson<T>(pub T);

#[derive(Debug, Error)]
pub enum TimedJsonRejection {
    #[error("failed to read body: {msg}")]
    Body { status: StatusCode, msg: String },
    #[error("malformed json: {0}")]
    Syntax(serde_json::Error),
    #[error("invalid body: {0}")]
    Validation(serde_json::Error),
}

impl TimedJsonRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            TimedJsonRejection::Body { status, .. } => *status,
            TimedJsonRejection::Syntax(_) | TimedJsonRejection::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for TimedJsonRejection {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": "BAD_REQUEST",
                "msg": self.to_string()
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for TimedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = TimedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let handle = req.extensions().get::<TimingHandle>().cloned();

        let bytes = Bytes::from_request(req, state).await.map_err(|e| TimedJsonRejection::Body {
            status: e.status(),
            msg: e.body_text(),
        })?;
        let doc: serde_json::Value = serde_json::from_slice(&bytes).map_err(TimedJsonRejection::Syntax)?;

        if let Some(h) = &handle {
            h.mark(LifecycleEvent::PreValidate);
        }

        let value = serde_json::from_value(doc).map_err(TimedJsonRejection::Validation)?;

        if let Some(h) = &handle {
            h.mark(LifecycleEvent::PreHandle);
        }
        Ok(TimedJson(value))
    }
}
