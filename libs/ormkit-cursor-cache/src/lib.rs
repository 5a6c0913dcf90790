//! Caching cursor plugin for `ormkit-model`.
//!
//! Provides a TTL-based row cache behind the cursor seam: fetches are served
//! from a `moka` cache keyed by statement key, and the whole cache can be
//! dropped through the cache-clearable capability. Install it with
//! [`register`] so models can select it via the `cursor_class` option or the
//! `enable_cache` toggle.

pub mod config;

pub use config::CachedCursorConfig;

use moka::sync::Cache;
use ormkit_model::{ClearableCursor, Cursor, CursorRegistry, Result, DEFAULT_CACHE_CURSOR};
use serde_json::Value;

/// Cursor caching materialized row sets with a TTL.
pub struct CachedCursor {
    cache: Cache<String, Vec<Value>>,
}

impl CachedCursor {
    /// Class name this cursor registers under.
    pub const CLASS_NAME: &'static str = DEFAULT_CACHE_CURSOR;

    #[must_use]
    pub fn new(cfg: &CachedCursorConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(cfg.max_entries)
            .time_to_live(cfg.ttl)
            .build();
        Self { cache }
    }

    /// Number of cached row sets.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for CachedCursor {
    fn default() -> Self {
        Self::new(&CachedCursorConfig::default())
    }
}

impl Cursor for CachedCursor {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn fetch(
        &self,
        key: &str,
        load: &mut dyn FnMut() -> Result<Vec<Value>>,
    ) -> Result<Vec<Value>> {
        if let Some(rows) = self.cache.get(key) {
            return Ok(rows);
        }
        let rows = load()?;
        self.cache.insert(key.to_owned(), rows.clone());
        Ok(rows)
    }

    fn as_clearable(&self) -> Option<&dyn ClearableCursor> {
        Some(self)
    }
}

impl ClearableCursor for CachedCursor {
    fn clear(&self) {
        tracing::debug!(cursor = Self::CLASS_NAME, "clearing cached row sets");
        self.cache.invalidate_all();
    }
}

/// Install the caching cursor class with default settings.
pub fn register(registry: &CursorRegistry) {
    register_with(registry, CachedCursorConfig::default());
}

/// Install the caching cursor class with explicit settings.
pub fn register_with(registry: &CursorRegistry, cfg: CachedCursorConfig) {
    registry.register(CachedCursor::CLASS_NAME, move || CachedCursor::new(&cfg));
}
