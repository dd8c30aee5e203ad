//! Intercepted request description

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE,
    IF_UNMODIFIED_SINCE, RANGE,
};
use reqwest::{Method, Url};

use crate::domain::cache::RequestKey;
use crate::domain::DomainError;

/// Headers that make the origin answer with a partial or empty body
static VALIDATOR_HEADERS: [HeaderName; 6] = [
    IF_NONE_MATCH,
    IF_MODIFIED_SINCE,
    IF_MATCH,
    IF_UNMODIFIED_SINCE,
    RANGE,
    IF_RANGE,
];

/// A request observed by the interceptor. Never persisted.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a GET request for an absolute URL
    pub fn get(url: &str) -> Result<Self, DomainError> {
        let url = Url::parse(url)
            .map_err(|e| DomainError::validation(format!("Invalid URL '{}': {}", url, e)))?;

        Ok(Self::new(Method::GET, url))
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path component used for strategy selection
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }

    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }

    /// Drops conditional and range headers so the origin returns the full
    /// representation. A 304 or 206 must never become a cache entry.
    pub fn without_validators(mut self) -> Self {
        for name in &VALIDATOR_HEADERS {
            self.headers.remove(name);
        }
        self
    }
}
