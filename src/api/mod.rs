//! HTTP host adapter for the interceptor

pub mod health;
pub mod host;
pub mod middleware;
pub mod router;
pub mod state;

pub use host::ServerHost;
pub use router::{STRATEGY_HEADER, create_proxy_router};
pub use state::ProxyState;
