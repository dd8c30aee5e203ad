//! Maps a request path to its caching strategy

use std::fmt;

/// Cache/network interaction policy for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Network first, cache as offline fallback. Frequently changing data.
    NetworkFirst,
    /// Serve cached copy immediately and refresh it in the background. App shell.
    StaleWhileRevalidate,
    /// Cache first; on a miss fetch and store. Rarely changing media.
    CacheFirstRefill,
    /// Cache first; on a miss fetch without storing. Everything else.
    CacheFirst,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
            Strategy::CacheFirstRefill => "cache-first-refill",
            Strategy::CacheFirst => "cache-first",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SHELL_EXTENSIONS: [&str; 3] = [".html", ".css", ".js"];

/// Classifies a URL path. Rules are checked in order and the first match wins.
pub fn select_strategy(path: &str) -> Strategy {
    if path.ends_with("data.json") {
        Strategy::NetworkFirst
    } else if SHELL_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        Strategy::StaleWhileRevalidate
    } else if path.contains("/images/") {
        Strategy::CacheFirstRefill
    } else {
        Strategy::CacheFirst
    }
}
