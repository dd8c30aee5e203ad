//! In-memory cache storage

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::cache::{CacheStorage, CacheStore, RequestKey, validate_cache_name};
use crate::domain::fetch::StoredResponse;

/// Process-lifetime cache storage
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryCacheStorage {
    generations: RwLock<BTreeMap<String, Arc<InMemoryCacheStore>>>,
}

impl InMemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>, DomainError> {
        validate_cache_name(name)?;

        let mut generations = self.generations.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let store = generations
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCacheStore::new(name)))
            .clone();

        Ok(store)
    }

    async fn has(&self, name: &str) -> Result<bool, DomainError> {
        let generations = self.generations.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(generations.contains_key(name))
    }

    async fn keys(&self) -> Result<Vec<String>, DomainError> {
        let generations = self.generations.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(generations.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, DomainError> {
        let mut generations = self.generations.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(generations.remove(name).is_some())
    }
}

/// One in-memory generation
#[derive(Debug)]
pub struct InMemoryCacheStore {
    name: String,
    entries: RwLock<HashMap<RequestKey, StoredResponse>>,
}

impl InMemoryCacheStore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<StoredResponse>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::cache(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: RequestKey, response: StoredResponse) -> Result<(), DomainError> {
        key.ensure_cacheable()?;

        let mut entries = self.entries.write().map_err(|e| {
            DomainError::cache(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.insert(key, response);
        Ok(())
    }

    async fn put_all(&self, batch: Vec<(RequestKey, StoredResponse)>) -> Result<(), DomainError> {
        for (key, _) in &batch {
            key.ensure_cacheable()?;
        }

        let mut entries = self.entries.write().map_err(|e| {
            DomainError::cache(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.extend(batch);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::cache(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut keys: Vec<RequestKey> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fetch::FetchResponse;
    use reqwest::{Method, Url};

    fn key(url: &str) -> RequestKey {
        RequestKey::get(&Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_open_creates_and_reuses_generation() {
        let storage = InMemoryCacheStorage::new();
        assert!(!storage.has("app-v2").await.unwrap());

        let first = storage.open("app-v2").await.unwrap();
        first
            .put(key("http://a/"), FetchResponse::ok("root").into_snapshot())
            .await
            .unwrap();

        let second = storage.open("app-v2").await.unwrap();
        assert!(storage.has("app-v2").await.unwrap());
        assert!(second.lookup(&key("http://a/")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();

        store
            .put(key("http://a/x"), FetchResponse::ok("one").into_snapshot())
            .await
            .unwrap();
        store
            .put(key("http://a/x"), FetchResponse::ok("two").into_snapshot())
            .await
            .unwrap();

        let stored = store.lookup(&key("http://a/x")).await.unwrap().unwrap();
        assert_eq!(stored.body().as_ref(), b"two");
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_rejects_non_get() {
        let storage = InMemoryCacheStorage::new();
        let store = storage.open("app-v2").await.unwrap();
        let post = RequestKey::new(&Method::POST, &Url::parse("http://a/x").unwrap());

        let result = store.put(post, FetchResponse::ok("x").into_snapshot()).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let storage = InMemoryCacheStorage::new();
        storage.open("app-v1").await.unwrap();
        storage.open("app-v2").await.unwrap();

        assert!(storage.delete("app-v1").await.unwrap());
        assert!(!storage.delete("app-v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["app-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_name() {
        let storage = InMemoryCacheStorage::new();
        assert!(storage.open("").await.is_err());
    }
}
