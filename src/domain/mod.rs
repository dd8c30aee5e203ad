//! Domain layer - caching policies, lifecycle and their contracts

pub mod cache;
pub mod error;
pub mod fetch;
pub mod lifecycle;
pub mod strategy;

pub use cache::{CacheStorage, CacheStore, CacheStoreExt, RequestKey};
pub use error::DomainError;
pub use fetch::{FetchRequest, FetchResponse, Fetcher, StoredResponse};
pub use lifecycle::{
    AssetManifest, CacheProxy, GenerationId, InstallReport, Intercepted, Interceptor,
    LifecycleHost, ProxySettings, PruneReport, Route,
};
pub use strategy::{Strategy, StrategyExecutor, select_strategy};
