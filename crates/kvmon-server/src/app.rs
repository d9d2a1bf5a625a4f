use crate::logging;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub targets: usize,
    pub series: usize,
    pub uptime_secs: i64,
}

pub fn build_http_app(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .layer(middleware::from_fn(logging::request_logging))
        .with_state(state)
}

/// Prometheus text exposition of the metric store.
async fn metrics(State(state): State<AppState>) -> Response {
    match state.store.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, state.store.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        targets: state.target_count,
        series: state.store.len(),
        uptime_secs: state.uptime_secs(),
    })
}
