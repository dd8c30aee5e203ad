//! Cache domain - versioned request/response cache abstraction

mod key;
mod repository;

pub use key::{RequestKey, validate_cache_name};
pub use repository::{CacheStorage, CacheStore, CacheStoreExt};

#[cfg(test)]
pub use repository::MockCacheStorage;
