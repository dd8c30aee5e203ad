//! Lifecycle domain - install/activate hooks and request interception

mod generation;
mod host;
mod interceptor;
mod proxy;

pub use generation::{AssetManifest, GenerationId, PruneReport, prune_generations};
pub use host::LifecycleHost;
pub use interceptor::{InstallReport, Intercepted, Interceptor, Route};
pub use proxy::{CacheProxy, ProxySettings};

#[cfg(test)]
pub use host::MockLifecycleHost;
