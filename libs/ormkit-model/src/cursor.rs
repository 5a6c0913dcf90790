//! Cursor strategies and the capability-checked cursor registry.
//!
//! A cursor governs how result rows are fetched and cached for one model.
//! Cursor classes are resolved by name against a [`CursorRegistry`] rather
//! than loaded dynamically; an unregistered name and a registered class
//! lacking a required capability fail distinctly.

use crate::Result;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Factory producing cursor instances for a registered class name.
pub type CursorFactory = Arc<dyn Fn() -> Arc<dyn Cursor> + Send + Sync>;

/// Row-fetch strategy selected per model.
pub trait Cursor: Send + Sync {
    /// Registered class name of this cursor.
    fn class_name(&self) -> &str;

    /// Fetch rows for `key`, calling `load` to materialize them on a miss.
    ///
    /// # Errors
    /// Propagates errors from `load`.
    fn fetch(
        &self,
        key: &str,
        load: &mut dyn FnMut() -> Result<Vec<Value>>,
    ) -> Result<Vec<Value>>;

    /// Cache-clearable capability hook; `None` when unsupported.
    fn as_clearable(&self) -> Option<&dyn ClearableCursor> {
        None
    }
}

impl std::fmt::Debug for dyn Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("class_name", &self.class_name())
            .finish()
    }
}

/// Cache-clearable cursor capability.
pub trait ClearableCursor: Cursor {
    /// Drop all cached rows.
    fn clear(&self);
}

/// Errors raised when resolving a cursor class by name.
#[derive(Debug, Error)]
pub enum CursorClassError {
    #[error("Cursor class '{0}' is not registered")]
    Unregistered(String),

    #[error("Cursor class '{name}' does not provide the '{capability}' capability")]
    MissingCapability {
        name: String,
        capability: &'static str,
    },
}

/// Name to factory table for cursor classes.
#[derive(Default)]
pub struct CursorRegistry {
    factories: DashMap<String, CursorFactory>,
}

impl CursorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in passthrough cursor installed.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(PassthroughCursor::CLASS_NAME, || PassthroughCursor);
        registry
    }

    /// Register a cursor class under `name`, replacing any previous entry.
    pub fn register<C, F>(&self, name: &str, factory: F)
    where
        C: Cursor + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: CursorFactory = Arc::new(move || {
            let cursor: Arc<dyn Cursor> = Arc::new(factory());
            cursor
        });
        self.factories.insert(name.to_owned(), factory);
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the cursor class registered under `name`.
    ///
    /// # Errors
    /// Returns `CursorClassError::Unregistered` for unknown names.
    pub fn resolve(&self, name: &str) -> std::result::Result<Arc<dyn Cursor>, CursorClassError> {
        self.factories
            .get(name)
            .map(|entry| (entry.value())())
            .ok_or_else(|| CursorClassError::Unregistered(name.to_owned()))
    }

    /// Instantiate `name`, requiring the cache-clearable capability.
    ///
    /// # Errors
    /// Returns `CursorClassError::Unregistered` for unknown names and
    /// `CursorClassError::MissingCapability` when the class resolves but
    /// cannot clear its cache.
    pub fn resolve_clearable(
        &self,
        name: &str,
    ) -> std::result::Result<Arc<dyn Cursor>, CursorClassError> {
        let cursor = self.resolve(name)?;
        if cursor.as_clearable().is_none() {
            return Err(CursorClassError::MissingCapability {
                name: name.to_owned(),
                capability: "cache-clearable",
            });
        }
        Ok(cursor)
    }
}

/// Default cursor: no caching, every fetch delegates to the loader.
///
/// Trivially clearable since it holds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCursor;

impl PassthroughCursor {
    pub const CLASS_NAME: &'static str = "passthrough";
}

impl Cursor for PassthroughCursor {
    fn class_name(&self) -> &str {
        Self::CLASS_NAME
    }

    fn fetch(
        &self,
        _key: &str,
        load: &mut dyn FnMut() -> Result<Vec<Value>>,
    ) -> Result<Vec<Value>> {
        load()
    }

    fn as_clearable(&self) -> Option<&dyn ClearableCursor> {
        Some(self)
    }
}

impl ClearableCursor for PassthroughCursor {
    fn clear(&self) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Cursor without the clearable capability, for registry tests.
    struct OpaqueCursor;

    impl Cursor for OpaqueCursor {
        fn class_name(&self) -> &str {
            "opaque"
        }

        fn fetch(
            &self,
            _key: &str,
            load: &mut dyn FnMut() -> Result<Vec<Value>>,
        ) -> Result<Vec<Value>> {
            load()
        }
    }

    #[test]
    fn unregistered_name_fails_distinctly() {
        let registry = CursorRegistry::new();
        let err = registry.resolve("nope").unwrap_err();
        assert!(matches!(err, CursorClassError::Unregistered(_)));
    }

    #[test]
    fn missing_capability_fails_distinctly() {
        let registry = CursorRegistry::new();
        registry.register("opaque", || OpaqueCursor);

        // Plain resolution works.
        assert!(registry.resolve("opaque").is_ok());

        // Capability-checked resolution does not.
        let err = registry.resolve_clearable("opaque").unwrap_err();
        assert!(matches!(err, CursorClassError::MissingCapability { .. }));
    }

    #[test]
    fn builtin_passthrough_is_clearable() {
        let registry = CursorRegistry::with_builtins();
        let cursor = registry
            .resolve_clearable(PassthroughCursor::CLASS_NAME)
            .unwrap();
        assert_eq!(cursor.class_name(), "passthrough");
    }

    #[test]
    fn passthrough_always_loads() {
        let cursor = PassthroughCursor;
        let mut calls = 0;
        let mut load = || {
            calls += 1;
            Ok(vec![json!({"id": calls})])
        };

        let first = cursor.fetch("SELECT 1", &mut load).unwrap();
        let second = cursor.fetch("SELECT 1", &mut load).unwrap();
        assert_ne!(first, second);
        assert_eq!(calls, 2);
    }

    #[test]
    fn re_registration_replaces_factory() {
        let registry = CursorRegistry::new();
        registry.register("opaque", || OpaqueCursor);
        registry.register("opaque", || PassthroughCursor);
        assert!(registry.resolve_clearable("opaque").is_ok());
    }
}
