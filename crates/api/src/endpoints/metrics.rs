//! Metrics endpoint.

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chirp_common::get_metrics;

use crate::middleware::AppState;

/// Create the metrics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(prometheus))
}

/// Counters in Prometheus text format.
async fn prometheus() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        get_metrics().to_prometheus(),
    )
        .into_response()
}
