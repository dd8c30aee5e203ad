//! Per-request access logging

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::info;

use crate::api::router::STRATEGY_HEADER;

/// Logs one line per proxied request with the route it took.
/// Does not open its own span; `TraceLayer` already does.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let strategy = response
        .headers()
        .get(STRATEGY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        strategy = %strategy,
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
