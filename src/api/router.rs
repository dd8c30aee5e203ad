//! Bridges inbound HTTP requests to the interceptor

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use reqwest::Url;
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::health::{HEALTH_PATH, health_check};
use super::middleware::logging_middleware;
use super::state::ProxyState;
use crate::domain::{DomainError, FetchRequest, Intercepted, Interceptor};

/// Response header naming the route a request took
pub const STRATEGY_HEADER: HeaderName = HeaderName::from_static("x-cache-strategy");

/// Every path except the health endpoint goes through the interceptor
pub fn create_proxy_router(state: ProxyState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .fallback(intercept_handler)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn intercept_handler(State(state): State<ProxyState>, req: Request<Body>) -> Response {
    let request = match to_fetch_request(&state.upstream, req).await {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let url = request.url().to_string();

    match state.proxy.on_request(request).await {
        Ok(intercepted) => into_http_response(intercepted),
        Err(e) => {
            warn!(url = %url, error = %e, "Request failed");
            (StatusCode::BAD_GATEWAY, format!("Upstream unavailable: {}", e)).into_response()
        }
    }
}

/// Maps the inbound path and query onto the upstream origin
async fn to_fetch_request(upstream: &Url, req: Request<Body>) -> Result<FetchRequest, DomainError> {
    let (parts, body) = req.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", upstream.as_str().trim_end_matches('/'), path_and_query);
    let url = Url::parse(&target)
        .map_err(|e| DomainError::validation(format!("Invalid request target '{}': {}", target, e)))?;

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| DomainError::validation(format!("Failed to read request body: {}", e)))?;

    Ok(FetchRequest::new(parts.method, url)
        .with_headers(parts.headers)
        .with_body(body))
}

fn into_http_response(intercepted: Intercepted) -> Response {
    let Intercepted { route, response } = intercepted;
    let (status, headers, body) = response.into_parts();

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
        .headers_mut()
        .insert(STRATEGY_HEADER, HeaderValue::from_static(route.as_str()));

    response
}
