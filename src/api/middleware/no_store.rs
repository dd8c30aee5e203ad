//! Disables HTTP caching on origin responses

use axum::{
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0";
const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Leaves every freshness decision to the caching proxy in front
pub async fn no_store_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(header::EXPIRES, HeaderValue::from_static(EPOCH));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    response
}
