//! Serve command - runs the caching proxy in front of the upstream origin

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::{ProxyState, ServerHost, create_proxy_router};
use crate::config::AppConfig;
use crate::domain::{CacheProxy, Fetcher, Interceptor};
use crate::infrastructure::cache::CacheFactory;
use crate::infrastructure::logging;
use crate::infrastructure::network::HttpFetcher;

/// Arguments for the serve command
#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Origin to forward requests to (overrides config)
    #[arg(long)]
    pub upstream: Option<String>,

    /// Current cache generation identifier (overrides config)
    #[arg(long)]
    pub generation: Option<String>,
}

impl ServeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }

        if let Some(upstream) = &self.upstream {
            config.proxy.upstream = upstream.clone();
        }

        if let Some(generation) = &self.generation {
            config.proxy.generation = generation.clone();
        }
    }
}

/// Run the proxy: install, activate, then serve until shutdown
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    args.apply(&mut config);
    logging::init_logging(&config.logging);

    let settings = config.proxy.to_settings()?;
    let upstream = config.proxy.upstream_url()?;

    let storage = CacheFactory::create(&config.cache);
    let fetcher: Arc<dyn Fetcher> = match config.proxy.fetch_timeout() {
        Some(timeout) => Arc::new(HttpFetcher::with_timeout(timeout)?),
        None => Arc::new(HttpFetcher::new()),
    };
    let host = Arc::new(ServerHost::new());
    let proxy = Arc::new(CacheProxy::new(settings, storage, fetcher, host.clone()));

    if let Err(e) = proxy.on_install().await {
        error!(error = %e, "Install failed, not starting");
        return Err(e.into());
    }
    proxy.on_activate().await?;

    let app = create_proxy_router(ProxyState::new(proxy.clone(), host, upstream.clone()));

    let addr = build_socket_addr(&config)?;
    info!(
        "Starting proxy on {} (generation {}, upstream {})",
        addr,
        proxy.generation(),
        upstream
    );

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    proxy.settle().await;
    info!("Proxy shutdown complete");

    Ok(())
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

pub(crate) fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}
