//! The caching interceptor

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, error, info, warn};

use super::{
    AssetManifest, GenerationId, InstallReport, Intercepted, Interceptor, LifecycleHost,
    PruneReport, Route, prune_generations,
};
use crate::domain::DomainError;
use crate::domain::cache::{CacheStorage, CacheStoreExt};
use crate::domain::fetch::{FetchRequest, Fetcher};
use crate::domain::strategy::{StrategyExecutor, select_strategy};

/// Fixed identity of one interceptor instance
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub generation: GenerationId,
    pub manifest: AssetManifest,
    /// Base URL manifest entries are resolved against
    pub scope: Url,
}

/// Interceptor owning one cache generation and dispatching requests to
/// strategies. Storage, network and host are injected.
pub struct CacheProxy {
    settings: ProxySettings,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn LifecycleHost>,
    executor: StrategyExecutor,
}

impl CacheProxy {
    pub fn new(
        settings: ProxySettings,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        host: Arc<dyn LifecycleHost>,
    ) -> Self {
        Self {
            executor: StrategyExecutor::new(fetcher.clone()),
            settings,
            storage,
            fetcher,
            host,
        }
    }

    pub fn generation(&self) -> &GenerationId {
        &self.settings.generation
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Waits until all background work spawned by requests has finished
    pub async fn settle(&self) {
        let pending = self.executor.pending();
        pending.close();
        pending.wait().await;
        pending.reopen();
    }
}

#[async_trait]
impl Interceptor for CacheProxy {
    async fn on_install(&self) -> Result<InstallReport, DomainError> {
        let generation = self.settings.generation.as_str();
        self.host.skip_waiting().await;

        let requests = self.settings.manifest.requests(&self.settings.scope)?;
        let existed = self.storage.has(generation).await?;
        let store = self.storage.open(generation).await?;

        match store.add_all(self.fetcher.as_ref(), &requests).await {
            Ok(cached) => {
                info!(generation, cached, "Installed core assets");

                Ok(InstallReport {
                    generation: generation.to_string(),
                    cached,
                })
            }
            Err(e) => {
                error!(generation, error = %e, "Install failed");

                if !existed {
                    if let Err(cleanup) = self.storage.delete(generation).await {
                        warn!(generation, error = %cleanup, "Failed to discard unpopulated generation");
                    }
                }

                Err(e)
            }
        }
    }

    async fn on_activate(&self) -> Result<PruneReport, DomainError> {
        let generation = &self.settings.generation;

        let report = match prune_generations(self.storage.as_ref(), generation).await {
            Ok(report) => report,
            Err(e) => {
                warn!(generation = %generation, error = %e, "Could not enumerate cache generations");
                PruneReport::default()
            }
        };

        self.host.claim_clients().await?;

        info!(
            generation = %generation,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Activated"
        );

        Ok(report)
    }

    async fn on_request(&self, request: FetchRequest) -> Result<Intercepted, DomainError> {
        if !request.is_cacheable() {
            debug!(method = %request.method(), url = %request.url(), "Bypassing cache");

            let response = self.fetcher.fetch(&request).await?;
            return Ok(Intercepted {
                route: Route::Bypass,
                response,
            });
        }

        let request = request.without_validators();
        let strategy = select_strategy(request.path());
        debug!(url = %request.url(), strategy = %strategy, "Dispatching request");

        let store = self
            .storage
            .open(self.settings.generation.as_str())
            .await?;
        let response = self.executor.execute(strategy, store, request).await?;

        Ok(Intercepted {
            route: Route::Strategy(strategy),
            response,
        })
    }
}
