//! Signals the interceptor sends back to its hosting environment

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Hosting environment of an interceptor instance
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LifecycleHost: Send + Sync {
    /// Become active as soon as install completes instead of waiting for
    /// clients of the previous instance to go away
    async fn skip_waiting(&self);

    /// Start serving every already-connected client
    async fn claim_clients(&self) -> Result<(), DomainError>;
}
