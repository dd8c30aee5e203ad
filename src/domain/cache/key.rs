//! Request identity used to address cache entries

use std::fmt;

use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Identity of a cached request: method plus absolute URL without fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    method: String,
    url: String,
}

impl RequestKey {
    /// Builds the identity for a request
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);

        Self {
            method: method.as_str().to_ascii_uppercase(),
            url: url.to_string(),
        }
    }

    /// Identity of a GET request for the given URL
    pub fn get(url: &Url) -> Self {
        Self::new(&Method::GET, url)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Only GET requests may be stored
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET.as_str()
    }

    /// Rejects identities that must never be written to a cache
    pub fn ensure_cacheable(&self) -> Result<(), DomainError> {
        if self.is_cacheable() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "Only GET requests can be cached, got {}",
                self
            )))
        }
    }

    /// Filename-safe digest of the identity
    pub fn to_filename(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());

        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Validates a cache generation name for use as a storage namespace
pub fn validate_cache_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Cache name cannot be empty"));
    }

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(DomainError::validation(format!(
            "Cache name '{}' must not contain path separators",
            name
        )));
    }

    Ok(())
}
