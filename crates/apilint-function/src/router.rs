//! Axum router for the custom handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use apilint::{LintEngine, Pipeline};

use crate::envelope::{InvokeRequest, InvokeResponse, EVENT_BINDING, INVOCATION_ID_HEADER};

/// Route the host calls for the Event Grid trigger (the function name).
pub const TRIGGER_ROUTE: &str = "/linter-function-events-trigger";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Create the router with all routes.
pub fn create_router<E>(pipeline: Arc<Pipeline<E>>) -> Router
where
    E: LintEngine + 'static,
{
    Router::new()
        .route(TRIGGER_ROUTE, post(handle_trigger::<E>))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// POST /linter-function-events-trigger
///
/// A failed invocation answers 500 so the host records it as failed.
async fn handle_trigger<E>(
    State(pipeline): State<Arc<Pipeline<E>>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<InvokeResponse>)
where
    E: LintEngine + 'static,
{
    let invocation_id = headers
        .get(INVOCATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let event = match serde_json::from_slice::<InvokeRequest>(&body) {
        Ok(request) => request.binding(EVENT_BINDING),
        Err(e) => {
            tracing::warn!(error = %e, "malformed invocation envelope");
            None
        }
    };

    match pipeline.run(&invocation_id, event.as_ref()).await {
        Ok(report) => (StatusCode::OK, Json(InvokeResponse::completed(&report))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(InvokeResponse::failed(&e)),
        ),
    }
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
