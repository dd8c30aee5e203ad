//! Cache infrastructure - storage backends

mod factory;
mod file;
mod in_memory;

pub use factory::{CacheBackend, CacheConfig, CacheFactory};
pub use file::{FileCacheStorage, FileCacheStore};
pub use in_memory::{InMemoryCacheStorage, InMemoryCacheStore};
