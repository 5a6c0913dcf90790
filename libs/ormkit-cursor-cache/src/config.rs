//! Configuration for the caching cursor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Caching cursor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachedCursorConfig {
    /// Time-to-live for cached row sets.
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,

    /// Maximum number of cached row sets.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

fn default_ttl() -> Duration {
    Duration::from_secs(60)
}

fn default_max_entries() -> u64 {
    10_000
}

impl Default for CachedCursorConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}
