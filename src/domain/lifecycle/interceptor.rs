//! Interceptor contract between the core and its host adapter

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::PruneReport;
use crate::domain::DomainError;
use crate::domain::fetch::{FetchRequest, FetchResponse};
use crate::domain::strategy::Strategy;

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub generation: String,
    pub cached: usize,
}

/// How a request was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not cacheable; sent straight to the network
    Bypass,
    Strategy(Strategy),
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Bypass => "bypass",
            Route::Strategy(strategy) => strategy.as_str(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response for one intercepted request
#[derive(Debug)]
pub struct Intercepted {
    pub route: Route,
    pub response: FetchResponse,
}

/// Lifecycle hooks and request dispatch, invoked by a host adapter.
///
/// The host must await each returned future before treating the hook as
/// complete.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Populates the current generation with the asset manifest
    async fn on_install(&self) -> Result<InstallReport, DomainError>;

    /// Removes stale generations, then claims clients
    async fn on_activate(&self) -> Result<PruneReport, DomainError>;

    /// Produces exactly one response or failure for the request
    async fn on_request(&self, request: FetchRequest) -> Result<Intercepted, DomainError>;
}
