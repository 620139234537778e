//! `/` handlers: record a visit, answer preflight.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use visitcount_core::StoreOperationFailure;

use crate::app_state::AppState;

/// Body returned to the caller on any store failure. Never carries detail.
pub const FAILURE_MESSAGE: &str = "Failed to update visitor count";

#[derive(Debug, Serialize)]
pub struct CountBody {
    pub count: u64,
}

/// Handler-boundary view of a failed increment.
///
/// Turning it into a response logs the failure once at error level and
/// answers with the fixed 500 body; the cause never reaches the client.
#[derive(Debug)]
pub struct VisitError {
    failure: StoreOperationFailure,
    store: &'static str,
}

impl VisitError {
    pub fn new(failure: StoreOperationFailure, store: &'static str) -> Self {
        Self { failure, store }
    }
}

impl IntoResponse for VisitError {
    fn into_response(self) -> Response {
        let e = &self.failure;
        tracing::error!(
            op = e.op.as_str(),
            kind = e.source.kind(),
            store = self.store,
            "failed to update visitor count: {e}"
        );

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": FAILURE_MESSAGE })),
        )
            .into_response()
    }
}

/// GET and POST `/`. Any request body is ignored.
pub async fn record_visit(State(state): State<AppState>) -> Result<Json<CountBody>, VisitError> {
    let counter = state.counter();
    let metrics = state.metrics();

    let started = Instant::now();
    let result = counter.increment().await;
    metrics
        .store_duration
        .observe(&[("mode", counter.mode().as_str())], started.elapsed());

    match result {
        Ok(count) => {
            metrics.requests.inc(&[("outcome", "ok")]);
            tracing::debug!(count, "visit recorded");
            Ok(Json(CountBody { count }))
        }
        Err(e) => {
            metrics.requests.inc(&[("outcome", "error")]);
            Err(VisitError::new(e, counter.store_name()))
        }
    }
}

/// OPTIONS `/`. Empty 200; the CORS layer adds the headers. No store access.
pub async fn preflight(State(state): State<AppState>) -> StatusCode {
    state.metrics().preflights.inc(&[]);
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use visitcount_core::{CounterError, DocumentKey, StoreOp};

    #[tokio::test]
    async fn visit_error_masks_the_cause() {
        let failure = StoreOperationFailure {
            op: StoreOp::Update,
            key: DocumentKey::default(),
            source: CounterError::PermissionDenied("secret path /var/db".into()),
        };
        let resp = VisitError::new(failure, "file").into_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": FAILURE_MESSAGE }));
    }
}
