//! Origin command - serves the static application with HTTP caching disabled

use std::path::{Path, PathBuf};

use axum::Router;
use axum::middleware;
use clap::Args;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::serve::{build_socket_addr, shutdown_signal};
use crate::api::middleware::no_store_middleware;
use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Arguments for the origin command
#[derive(Args, Clone, Debug)]
pub struct OriginArgs {
    /// Directory to serve
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Port to listen on
    #[arg(long, default_value_t = 8081)]
    pub port: u16,
}

/// Run the static origin server
pub async fn run(args: OriginArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    config.server.port = args.port;
    logging::init_logging(&config.logging);

    let app = create_origin_router(&args.dir);

    let addr = build_socket_addr(&config)?;
    info!("Serving {} on {} with caching disabled", args.dir.display(), addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Static file router; every response forbids HTTP caching
pub fn create_origin_router(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(middleware::from_fn(no_store_middleware))
        .layer(TraceLayer::new_for_http())
}
