//! Strategy executors

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::debug;

use super::Strategy;
use crate::domain::DomainError;
use crate::domain::cache::{CacheStore, CacheStoreExt};
use crate::domain::fetch::{FetchRequest, FetchResponse, Fetcher};

/// Runs a request through one of the caching strategies.
///
/// Background work (the revalidation refill) is registered on the
/// executor's tracker so the owner can wait for it before shutting down.
#[derive(Clone)]
pub struct StrategyExecutor {
    fetcher: Arc<dyn Fetcher>,
    pending: TaskTracker,
}

impl StrategyExecutor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            pending: TaskTracker::new(),
        }
    }

    /// Tracker holding in-flight background work
    pub fn pending(&self) -> &TaskTracker {
        &self.pending
    }

    pub async fn execute(
        &self,
        strategy: Strategy,
        store: Arc<dyn CacheStore>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DomainError> {
        match strategy {
            Strategy::NetworkFirst => self.network_first(store, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(store, request).await,
            Strategy::CacheFirstRefill => self.cache_first_refill(store, request).await,
            Strategy::CacheFirst => self.cache_first(store, request).await,
        }
    }

    /// One network attempt; on success store a copy, on failure fall back to the cache
    async fn network_first(
        &self,
        store: Arc<dyn CacheStore>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DomainError> {
        let key = request.key();

        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                store
                    .put_quietly(key, response.duplicate().into_snapshot())
                    .await;
                Ok(response)
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Network failed, falling back to cache");

                match store.lookup_or_miss(&key).await {
                    Some(cached) => Ok(cached.to_response()),
                    None => Err(DomainError::not_found(format!(
                        "No cached response for {} after network failure: {}",
                        key, e
                    ))),
                }
            }
        }
    }

    /// Cached copy if present, with a concurrent network refill either way
    async fn stale_while_revalidate(
        &self,
        store: Arc<dyn CacheStore>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DomainError> {
        let key = request.key();

        let refill = {
            let fetcher = self.fetcher.clone();
            let store = store.clone();
            let key = key.clone();

            self.pending.spawn(async move {
                match fetcher.fetch(&request).await {
                    Ok(response) => {
                        store
                            .put_quietly(key, response.duplicate().into_snapshot())
                            .await;
                        Ok(response)
                    }
                    Err(e) => {
                        debug!(key = %key, error = %e, "Background revalidation failed");
                        Err(e)
                    }
                }
            })
        };

        if let Some(cached) = store.lookup_or_miss(&key).await {
            return Ok(cached.to_response());
        }

        refill
            .await
            .map_err(|e| DomainError::internal(format!("Revalidation task failed: {}", e)))?
    }

    /// Trusts any cached entry; fills the cache on a miss
    async fn cache_first_refill(
        &self,
        store: Arc<dyn CacheStore>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DomainError> {
        let key = request.key();

        if let Some(cached) = store.lookup_or_miss(&key).await {
            return Ok(cached.to_response());
        }

        let response = self.fetcher.fetch(&request).await?;
        store
            .put_quietly(key, response.duplicate().into_snapshot())
            .await;

        Ok(response)
    }

    /// Serves cached entries but never writes
    async fn cache_first(
        &self,
        store: Arc<dyn CacheStore>,
        request: FetchRequest,
    ) -> Result<FetchResponse, DomainError> {
        if let Some(cached) = store.lookup_or_miss(&request.key()).await {
            return Ok(cached.to_response());
        }

        self.fetcher.fetch(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::cache::{CacheStorage, RequestKey};
    use crate::domain::fetch::{MockFetcher, StubFetcher};
    use crate::infrastructure::cache::InMemoryCacheStorage;

    struct Harness {
        fetcher: Arc<StubFetcher>,
        executor: StrategyExecutor,
        store: Arc<dyn CacheStore>,
    }

    async fn harness(fetcher: StubFetcher) -> Harness {
        let fetcher = Arc::new(fetcher);
        let storage = InMemoryCacheStorage::new();

        Harness {
            executor: StrategyExecutor::new(fetcher.clone()),
            store: storage.open("app-v2").await.unwrap(),
            fetcher,
        }
    }

    impl Harness {
        async fn seed(&self, url: &str, body: &str) {
            let request = FetchRequest::get(url).unwrap();
            self.store
                .put(request.key(), FetchResponse::ok(body.to_string()).into_snapshot())
                .await
                .unwrap();
        }

        async fn cached_body(&self, url: &str) -> Option<String> {
            let key = RequestKey::get(&url.parse().unwrap());
            self.store
                .lookup(&key)
                .await
                .unwrap()
                .map(|r| String::from_utf8(r.body().to_vec()).unwrap())
        }

        async fn run(&self, strategy: Strategy, url: &str) -> Result<FetchResponse, DomainError> {
            let request = FetchRequest::get(url).unwrap();
            self.executor
                .execute(strategy, self.store.clone(), request)
                .await
        }

        async fn settle(&self) {
            self.executor.pending().close();
            self.executor.pending().wait().await;
            self.executor.pending().reopen();
        }
    }

    fn body(response: &FetchResponse) -> &str {
        std::str::from_utf8(response.body()).unwrap()
    }

    const DATA: &str = "http://app/data.json";
    const SHELL: &str = "http://app/index.html";
    const IMAGE: &str = "http://app/images/pasta.jpg";
    const OTHER: &str = "http://app/manifest.json";

    #[tokio::test]
    async fn test_network_first_returns_network_and_updates_cache() {
        let h = harness(StubFetcher::new().with_body(DATA, "fresh")).await;
        h.seed(DATA, "old").await;

        let response = h.run(Strategy::NetworkFirst, DATA).await.unwrap();

        assert_eq!(body(&response), "fresh");
        assert_eq!(h.cached_body(DATA).await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache_offline() {
        let h = harness(StubFetcher::new().with_failure(DATA)).await;
        h.seed(DATA, "yesterday").await;

        let response = h.run(Strategy::NetworkFirst, DATA).await.unwrap();

        assert_eq!(body(&response), "yesterday");
        assert_eq!(h.fetcher.calls_for(DATA), 1);
    }

    #[tokio::test]
    async fn test_network_first_offline_and_uncached_fails() {
        let h = harness(StubFetcher::new().with_failure(DATA)).await;

        let error = h.run(Strategy::NetworkFirst, DATA).await.unwrap_err();

        assert!(matches!(error, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_network_first_makes_exactly_one_attempt() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|r| Err(DomainError::network(r.url().as_str(), "offline")));
        let executor = StrategyExecutor::new(Arc::new(fetcher));

        let result = executor
            .execute(Strategy::NetworkFirst, store, FetchRequest::get(DATA).unwrap())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_serves_cached_then_refreshes() {
        let h = harness(StubFetcher::new().with_body(SHELL, "v2")).await;
        h.seed(SHELL, "v1").await;

        let response = h.run(Strategy::StaleWhileRevalidate, SHELL).await.unwrap();
        assert_eq!(body(&response), "v1");

        h.settle().await;
        assert_eq!(h.cached_body(SHELL).await.as_deref(), Some("v2"));
        assert_eq!(h.fetcher.calls_for(SHELL), 1);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_hit_does_not_wait_for_network() {
        let (fetcher, gate) = StubFetcher::new().with_body(SHELL, "v2").gated();
        let h = harness(fetcher).await;
        h.seed(SHELL, "v1").await;

        let response = tokio::time::timeout(
            Duration::from_secs(1),
            h.run(Strategy::StaleWhileRevalidate, SHELL),
        )
        .await
        .expect("cached response should not wait on the network")
        .unwrap();
        assert_eq!(body(&response), "v1");

        gate.add_permits(1);
        h.settle().await;
        assert_eq!(h.cached_body(SHELL).await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_miss_waits_for_network() {
        let h = harness(StubFetcher::new().with_body(SHELL, "v1")).await;

        let response = h.run(Strategy::StaleWhileRevalidate, SHELL).await.unwrap();

        assert_eq!(body(&response), "v1");
        h.settle().await;
        assert_eq!(h.cached_body(SHELL).await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_swallows_refill_failure() {
        let h = harness(StubFetcher::new().with_failure(SHELL)).await;
        h.seed(SHELL, "v1").await;

        let response = h.run(Strategy::StaleWhileRevalidate, SHELL).await.unwrap();
        h.settle().await;

        assert_eq!(body(&response), "v1");
        assert_eq!(h.cached_body(SHELL).await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_miss_and_offline_fails() {
        let h = harness(StubFetcher::new().with_failure(SHELL)).await;

        let error = h.run(Strategy::StaleWhileRevalidate, SHELL).await.unwrap_err();

        assert!(error.is_network());
    }

    #[tokio::test]
    async fn test_cache_first_refill_fetches_once_then_serves_cache() {
        let h = harness(StubFetcher::new().with_body(IMAGE, "jpeg")).await;

        let first = h.run(Strategy::CacheFirstRefill, IMAGE).await.unwrap();
        assert_eq!(body(&first), "jpeg");
        assert_eq!(h.cached_body(IMAGE).await.as_deref(), Some("jpeg"));

        h.fetcher.set_body(IMAGE, "changed");
        let second = h.run(Strategy::CacheFirstRefill, IMAGE).await.unwrap();

        assert_eq!(body(&second), "jpeg");
        assert_eq!(h.fetcher.calls_for(IMAGE), 1);
    }

    #[tokio::test]
    async fn test_cache_first_refill_miss_and_offline_fails() {
        let h = harness(StubFetcher::new().with_failure(IMAGE)).await;

        let error = h.run(Strategy::CacheFirstRefill, IMAGE).await.unwrap_err();

        assert!(error.is_network());
        assert!(h.cached_body(IMAGE).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_first_never_writes() {
        let h = harness(StubFetcher::new().with_body(OTHER, "{}")).await;

        let response = h.run(Strategy::CacheFirst, OTHER).await.unwrap();

        assert_eq!(body(&response), "{}");
        assert!(h.cached_body(OTHER).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_first_repeated_hits_skip_network() {
        let h = harness(StubFetcher::new().with_body(OTHER, "network")).await;
        h.seed(OTHER, "cached").await;

        for _ in 0..3 {
            let response = h.run(Strategy::CacheFirst, OTHER).await.unwrap();
            assert_eq!(body(&response), "cached");
        }

        assert_eq!(h.fetcher.total_calls(), 0);
    }
}
