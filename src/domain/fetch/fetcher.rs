//! Network access trait

use async_trait::async_trait;

use super::{FetchRequest, FetchResponse};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// The network side of the proxy.
///
/// Resolves with a response for any HTTP status; only transport failures
/// (connect, DNS, timeout, body read) are errors.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, DomainError>;
}
