//! Cache storage factory for runtime selection

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::cache::CacheStorage;

use super::file::FileCacheStorage;
use super::in_memory::InMemoryCacheStorage;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process memory; lost on restart
    InMemory,
    /// One directory per generation on local disk
    #[default]
    File,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::InMemory => write!(f, "in_memory"),
            CacheBackend::File => write!(f, "file"),
        }
    }
}

/// Configuration for cache storage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Root directory for the file backend
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::File,
            dir: PathBuf::from(".offline-proxy-cache"),
        }
    }
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::InMemory,
            ..Default::default()
        }
    }

    pub fn file(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: CacheBackend::File,
            dir: dir.into(),
        }
    }
}

/// Factory for creating cache storage instances
pub struct CacheFactory;

impl CacheFactory {
    pub fn create(config: &CacheConfig) -> Arc<dyn CacheStorage> {
        info!(backend = %config.backend, "Creating cache storage");

        match config.backend {
            CacheBackend::InMemory => Arc::new(InMemoryCacheStorage::new()),
            CacheBackend::File => Arc::new(FileCacheStorage::new(config.dir.clone())),
        }
    }
}
