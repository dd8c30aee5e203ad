//! Lifecycle host backed by the HTTP server

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::domain::{DomainError, LifecycleHost};

/// Tracks lifecycle signals for the server process
#[derive(Debug, Default)]
pub struct ServerHost {
    claimed: AtomicBool,
}

impl ServerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once clients are served by this instance
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl LifecycleHost for ServerHost {
    /// A single server process has no previous instance to wait for
    async fn skip_waiting(&self) {
        info!("Skipping wait for previous instance");
    }

    async fn claim_clients(&self) -> Result<(), DomainError> {
        self.claimed.store(true, Ordering::Release);
        info!("Claimed clients");
        Ok(())
    }
}
