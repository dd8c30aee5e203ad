//! Offline proxy
//!
//! A caching proxy for a small web application:
//! - Pre-populates a versioned cache with core assets on install
//! - Garbage-collects stale cache generations on activate
//! - Serves each request under one of four freshness strategies chosen by path

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{CacheProxy, DomainError, Interceptor, Strategy};
