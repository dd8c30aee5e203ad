//! Infrastructure layer - storage backends, network and logging

pub mod cache;
pub mod logging;
pub mod network;
