//! Response types: the single-use network response and the stored snapshot

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// A response handed to exactly one consumer.
///
/// Not `Clone`. A path that both returns and stores a response must call
/// [`FetchResponse::duplicate`] first; storing consumes the response via
/// [`FetchResponse::into_snapshot`].
#[derive(Debug)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Option<String>,
}

impl FetchResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            url: None,
        }
    }

    /// A 200 response with no headers
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }

    /// Records the final URL the response was served from
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Independent copy for a second consumer
    pub fn duplicate(&self) -> Self {
        Self {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
            url: self.url.clone(),
        }
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Captures the response for storage
    pub fn into_snapshot(self) -> StoredResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        StoredResponse {
            meta: ResponseMeta {
                status: self.status.as_u16(),
                headers,
                url: self.url,
                stored_at_ms: now_millis(),
            },
            body: self.body,
        }
    }
}

/// Serializable part of a stored response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub stored_at_ms: u64,
}

/// Immutable capture of a response at the moment it was cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    meta: ResponseMeta,
    body: Bytes,
}

impl StoredResponse {
    pub fn from_parts(meta: ResponseMeta, body: impl Into<Bytes>) -> Self {
        Self {
            meta,
            body: body.into(),
        }
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A fresh response for one consumer; every lookup gets its own
    pub fn to_response(&self) -> FetchResponse {
        let status = StatusCode::from_u16(self.meta.status).unwrap_or(StatusCode::OK);

        let mut headers = HeaderMap::with_capacity(self.meta.headers.len());
        for (name, value) in &self.meta.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }

        FetchResponse {
            status,
            headers,
            body: self.body.clone(),
            url: self.meta.url.clone(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
