//! Health endpoint for the proxy itself

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use super::state::ProxyState;

/// Reserved path; never forwarded upstream
pub const HEALTH_PATH: &str = "/__proxy/health";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub generation: String,
    pub claimed: bool,
}

pub async fn health_check(State(state): State<ProxyState>) -> impl IntoResponse {
    let claimed = state.host.is_claimed();

    let response = HealthResponse {
        status: if claimed { "healthy" } else { "starting" },
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation: state.proxy.generation().to_string(),
        claimed,
    };

    let status = if claimed {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
