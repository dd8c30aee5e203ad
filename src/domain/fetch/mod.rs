//! Fetch domain - requests, responses and the network boundary

mod fetcher;
mod request;
mod response;

pub use fetcher::Fetcher;
pub use request::FetchRequest;
pub use response::{FetchResponse, ResponseMeta, StoredResponse};

#[cfg(test)]
pub use fetcher::MockFetcher;
#[cfg(test)]
pub use fetcher::mock::StubFetcher;
