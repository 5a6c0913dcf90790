//! Model-layer binding for `SeaORM`.
//!
//! This crate binds an application's model configuration convention to
//! `SeaORM`: it normalizes heterogeneous connect-info values into one
//! canonical [`ConnectionSpec`], selects a row-fetch cursor through a
//! capability-checked registry, composes an optional replication policy,
//! and builds a per-source accessor table from the schema's declared
//! monikers. Connection establishment, SQL generation, and transactions
//! are owned entirely by the wrapped ORM.
//!
//! # Example (`ModelManager` API)
//! ```rust,no_run
//! use figment::{Figment, providers::Serialized};
//! use ormkit_model::ModelManager;
//!
//! // Create configuration using Figment
//! let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
//!     "models": {
//!         "app": {
//!             "connect_info": ["sqlite://data/app.db"],
//!             "pool": { "max_conns": 5 }
//!         }
//!     }
//! })));
//!
//! let manager = ModelManager::from_figment(&figment).unwrap();
//! let schema = vec!["users".to_owned(), "orders".to_owned()];
//! let _model = manager.get("app", &schema).unwrap();
//! ```

// Core modules
pub mod config;
pub mod connect_info;
pub mod cursor;
pub mod manager;
pub mod model;
pub mod replication;
pub mod sources;

// Re-export important types
pub use config::{ModelConfig, ModelDefaults, PoolCfg, redact_credentials_in_dsn};
pub use connect_info::{ConnectInfoNormalizer, ConnectionSpec};
pub use cursor::{ClearableCursor, Cursor, CursorClassError, CursorRegistry, PassthroughCursor};
pub use manager::ModelManager;
pub use model::{DEFAULT_CACHE_CURSOR, Model, ModelHandle};
pub use replication::{BalanceStrategy, ReplicationPolicy};
pub use sources::{Schema, SourceHandle, SourceMap};

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Typed error for model construction and connection helpers.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid connect info: {0}")]
    InvalidConnectInfo(String),

    #[error(transparent)]
    CursorClassLoad(#[from] CursorClassError),

    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown source '{0}' in schema")]
    UnknownSource(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by DSN.
    ///
    /// Note: we only check scheme prefixes and don't mutate the tail
    /// (credentials etc.).
    ///
    /// # Errors
    /// Returns `ModelError::UnknownDsn` if the DSN scheme is not recognized.
    pub fn detect(dsn: &str) -> Result<Self> {
        // Trim only leading spaces/newlines to be forgiving with env files.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") || s.starts_with("sqlite://") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(ModelError::UnknownDsn(dsn.to_owned()))
        }
    }
}
