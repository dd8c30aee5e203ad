//! Network fetcher using reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONNECTION, CONTENT_LENGTH, HOST, HeaderMap, TRANSFER_ENCODING};

use crate::domain::DomainError;
use crate::domain::fetch::{FetchRequest, FetchResponse, Fetcher};

/// Real network access
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Applies a total timeout to every request
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops headers that describe a single connection rather than the resource
fn end_to_end(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in [HOST, CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING] {
        headers.remove(name);
    }

    headers
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, DomainError> {
        let url = request.url().as_str();

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(end_to_end(request.headers()));

        if !request.body().is_empty() {
            builder = builder.body(request.body().clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::network(url, format!("Request failed: {}", e)))?;

        let status = response.status();
        let headers = end_to_end(response.headers());
        let final_url = response.url().to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::network(url, format!("Failed to read body: {}", e)))?;

        Ok(FetchResponse::new(status, headers, body).with_url(final_url))
    }
}
