//! HTTP middleware components

pub mod logging;
pub mod no_store;

pub use logging::logging_middleware;
pub use no_store::no_store_middleware;
