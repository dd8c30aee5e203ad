//! Shared state for the proxy server

use std::sync::Arc;

use reqwest::Url;

use super::host::ServerHost;
use crate::domain::CacheProxy;

/// State shared by every request handler
#[derive(Clone)]
pub struct ProxyState {
    pub proxy: Arc<CacheProxy>,
    pub host: Arc<ServerHost>,
    /// Origin inbound paths are mapped onto
    pub upstream: Url,
}

impl ProxyState {
    pub fn new(proxy: Arc<CacheProxy>, host: Arc<ServerHost>, upstream: Url) -> Self {
        Self {
            proxy,
            host,
            upstream,
        }
    }
}
