//! CLI module for the offline proxy
//!
//! Provides subcommands:
//! - `serve`: caching proxy in front of the upstream origin
//! - `origin`: static file server with HTTP caching disabled
//! - `generations`: list or prune durable cache generations

pub mod generations;
pub mod origin;
pub mod serve;

use clap::{Parser, Subcommand};

/// Offline proxy - serves a small web app from a versioned cache
#[derive(Parser)]
#[command(name = "offline-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the caching proxy
    Serve(serve::ServeArgs),

    /// Serve a directory with HTTP caching disabled
    Origin(origin::OriginArgs),

    /// List or prune cache generations
    Generations(generations::GenerationsArgs),
}
