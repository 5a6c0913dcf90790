//! Per-source accessor table built once from the schema's declared sources.
//!
//! Instead of installing an accessor method per source at runtime, the model
//! builds one immutable moniker table at construction; lookups against
//! undeclared monikers fail with `ModelError::UnknownSource`.

use crate::{ModelError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Seam to the ORM-side schema: the set of declared source monikers.
pub trait Schema {
    /// Source monikers declared by the schema, in declaration order.
    fn source_names(&self) -> Vec<String>;
}

impl Schema for Vec<String> {
    fn source_names(&self) -> Vec<String> {
        self.clone()
    }
}

impl Schema for &[&str] {
    fn source_names(&self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

/// Accessor for one schema source, resolved against its owning model.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    model: Arc<str>,
    moniker: String,
}

impl SourceHandle {
    #[must_use]
    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    /// Name of the owning model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fully qualified accessor path (`model::moniker`).
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}::{}", self.model, self.moniker)
    }
}

/// Immutable moniker to accessor table, built once at model construction.
#[derive(Debug, Default)]
pub struct SourceMap {
    entries: HashMap<String, SourceHandle>,
}

impl SourceMap {
    /// Build the table from the schema's declared source names.
    #[must_use]
    pub fn build(model: &str, schema: &impl Schema) -> Self {
        let model: Arc<str> = Arc::from(model);
        let entries = schema
            .source_names()
            .into_iter()
            .map(|moniker| {
                let handle = SourceHandle {
                    model: Arc::clone(&model),
                    moniker: moniker.clone(),
                };
                (moniker, handle)
            })
            .collect();
        Self { entries }
    }

    /// Look up the accessor for `moniker`.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownSource` for monikers the schema does not
    /// declare.
    pub fn get(&self, moniker: &str) -> Result<&SourceHandle> {
        self.entries
            .get(moniker)
            .ok_or_else(|| ModelError::UnknownSource(moniker.to_owned()))
    }

    /// Declared monikers, in arbitrary order.
    pub fn monikers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_handle_per_source() {
        let schema: &[&str] = &["users", "orders"];
        let map = SourceMap::build("app", &schema);

        assert_eq!(map.len(), 2);
        let users = map.get("users").unwrap();
        assert_eq!(users.moniker(), "users");
        assert_eq!(users.model(), "app");
        assert_eq!(users.path(), "app::users");
    }

    #[test]
    fn undeclared_moniker_is_an_error() {
        let schema: &[&str] = &["users"];
        let map = SourceMap::build("app", &schema);

        let err = map.get("sessions").unwrap_err();
        assert!(matches!(err, ModelError::UnknownSource(_)));
        assert!(err.to_string().contains("sessions"));
    }

    #[test]
    fn empty_schema_builds_empty_map() {
        let schema: Vec<String> = Vec::new();
        let map = SourceMap::build("app", &schema);
        assert!(map.is_empty());
    }
}
