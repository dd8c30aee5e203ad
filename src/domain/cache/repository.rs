//! Cache storage traits

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use super::RequestKey;
use crate::domain::DomainError;
use crate::domain::fetch::{FetchRequest, Fetcher, StoredResponse};

#[cfg(test)]
use mockall::automock;

/// A set of named cache generations
///
/// Generations are created on first open and live until deleted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStorage: Send + Sync + Debug {
    /// Opens the named cache, creating it if absent
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>, DomainError>;

    /// Checks whether a cache with this name exists
    async fn has(&self, name: &str) -> Result<bool, DomainError>;

    /// Lists the names of all existing caches
    async fn keys(&self) -> Result<Vec<String>, DomainError>;

    /// Deletes the named cache, returning whether it existed
    async fn delete(&self, name: &str) -> Result<bool, DomainError>;
}

/// One cache generation: request identity to stored response
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Looks up the stored response for a request identity
    async fn lookup(&self, key: &RequestKey) -> Result<Option<StoredResponse>, DomainError>;

    /// Stores a response, overwriting any prior entry for the identity
    async fn put(&self, key: RequestKey, response: StoredResponse) -> Result<(), DomainError>;

    /// Stores a batch of responses
    ///
    /// Backends that can roll back a partially written batch should override this.
    async fn put_all(&self, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), DomainError> {
        for (key, response) in entries {
            self.put(key, response).await?;
        }

        Ok(())
    }

    /// Lists the stored identities
    async fn keys(&self) -> Result<Vec<RequestKey>, DomainError>;
}

/// Extension trait providing fetch-and-store helpers
pub trait CacheStoreExt: CacheStore {
    /// Fetches every request and stores all responses as one batch
    ///
    /// Nothing is written unless every fetch succeeds with a 2xx status.
    fn add_all<'a>(
        &'a self,
        fetcher: &'a dyn Fetcher,
        requests: &'a [FetchRequest],
    ) -> impl std::future::Future<Output = Result<usize, DomainError>> + Send {
        async move {
            let responses = try_join_all(requests.iter().map(|request| async move {
                let response = fetcher.fetch(request).await?;

                if !response.is_success() {
                    return Err(DomainError::network(
                        request.url().as_str(),
                        format!("Unexpected status {}", response.status()),
                    ));
                }

                Ok((request.key(), response.into_snapshot()))
            }))
            .await?;

            let count = responses.len();
            self.put_all(responses).await?;

            debug!(cache = %self.name(), count, "Stored batch");
            Ok(count)
        }
    }

    /// Stores a response, logging instead of failing
    fn put_quietly(
        &self,
        key: RequestKey,
        response: StoredResponse,
    ) -> impl std::future::Future<Output = ()> + Send {
        async move {
            let label = key.to_string();

            if let Err(e) = self.put(key, response).await {
                warn!(cache = %self.name(), key = %label, error = %e, "Failed to store response");
            }
        }
    }

    /// Looks up an entry, treating storage errors as a miss
    fn lookup_or_miss<'a>(
        &'a self,
        key: &'a RequestKey,
    ) -> impl std::future::Future<Output = Option<StoredResponse>> + Send {
        async move {
            match self.lookup(key).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(cache = %self.name(), key = %key, error = %e, "Cache lookup failed");
                    None
                }
            }
        }
    }
}

impl<T: CacheStore + ?Sized> CacheStoreExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fetch::StubFetcher;
    use crate::infrastructure::cache::InMemoryCacheStorage;
    use reqwest::StatusCode;

    fn requests(urls: &[&str]) -> Vec<FetchRequest> {
        urls.iter().map(|u| FetchRequest::get(u).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_add_all_stores_every_response() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();
        let fetcher = StubFetcher::new()
            .with_body("http://app/", "root")
            .with_body("http://app/index.html", "index");
        let batch = requests(&["http://app/", "http://app/index.html"]);

        let count = store.add_all(&fetcher, &batch).await.unwrap();

        assert_eq!(count, 2);
        for request in &batch {
            assert!(store.lookup(&request.key()).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_add_all_writes_nothing_when_one_fetch_fails() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();
        let fetcher = StubFetcher::new()
            .with_body("http://app/", "root")
            .with_failure("http://app/index.html");
        let batch = requests(&["http://app/", "http://app/index.html"]);

        let result = store.add_all(&fetcher, &batch).await;

        assert!(result.is_err());
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_all_rejects_error_status() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();
        let fetcher = StubFetcher::new()
            .with_body("http://app/", "root")
            .with_status("http://app/style.css", StatusCode::NOT_FOUND, "gone");
        let batch = requests(&["http://app/", "http://app/style.css"]);

        let error = store.add_all(&fetcher, &batch).await.unwrap_err();

        assert!(error.to_string().contains("404"));
        assert!(store.keys().await.unwrap().is_empty());
    }
}
