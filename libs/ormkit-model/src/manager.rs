//! Figment-backed model manager.
//!
//! Reads a `models.<name>` table plus an optional `defaults` section from the
//! application's configuration tree and builds [`Model`]s on demand.

use crate::config::{ModelConfig, ModelDefaults};
use crate::cursor::CursorRegistry;
use crate::model::Model;
use crate::sources::Schema;
use crate::Result;
use figment::Figment;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
struct ManagerConfig {
    #[serde(default)]
    defaults: ModelDefaults,
    #[serde(default)]
    models: HashMap<String, ModelConfig>,
}

/// Builds models from a Figment configuration tree.
pub struct ModelManager {
    config: ManagerConfig,
    registry: CursorRegistry,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ModelManager {
    /// Create a manager with the built-in cursor classes.
    ///
    /// # Errors
    /// Returns `ModelError::Figment` when the configuration tree cannot be
    /// deserialized.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        Self::with_registry(figment, CursorRegistry::with_builtins())
    }

    /// Create a manager with a caller-provided cursor registry (typically one
    /// with plugin cursor classes installed).
    ///
    /// # Errors
    /// Returns `ModelError::Figment` when the configuration tree cannot be
    /// deserialized.
    pub fn with_registry(figment: &Figment, registry: CursorRegistry) -> Result<Self> {
        let config: ManagerConfig = figment.extract()?;
        Ok(Self { config, registry })
    }

    /// The cursor registry models are resolved against.
    #[must_use]
    pub fn registry(&self) -> &CursorRegistry {
        &self.registry
    }

    /// Model names present in the configuration, in arbitrary order.
    #[must_use]
    pub fn model_names(&self) -> Vec<&str> {
        self.config.models.keys().map(String::as_str).collect()
    }

    /// Build the named model, or `None` when it is not configured.
    ///
    /// # Errors
    /// Propagates model construction failures (malformed connect info,
    /// unresolvable cursor class, replication conflicts).
    pub fn get(&self, name: &str, schema: &impl Schema) -> Result<Option<Model>> {
        let Some(cfg) = self.config.models.get(name) else {
            return Ok(None);
        };
        let merged = merge_defaults(cfg, &self.config.defaults);
        Model::from_config(name, &merged, &self.registry, schema).map(Some)
    }
}

/// Fill unset model fields from the defaults section; the model always wins.
fn merge_defaults(cfg: &ModelConfig, defaults: &ModelDefaults) -> ModelConfig {
    let mut merged = cfg.clone();
    if merged.balance.is_none() {
        merged.balance = defaults.balance;
    }
    if merged.enable_cache.is_none() {
        merged.enable_cache = defaults.enable_cache;
    }
    if merged.pool.is_none() {
        merged.pool = defaults.pool.clone();
    }
    merged
}
