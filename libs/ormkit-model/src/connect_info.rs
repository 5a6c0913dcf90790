//! Connect-info normalization.
//!
//! Model configuration historically accepts connect info in several shapes:
//! a bare DSN string, a positional list (`[dsn, user, password, {options...}]`),
//! a single option mapping, or a one-element list holding such a mapping.
//! Everything is folded into one canonical [`ConnectionSpec`] before the model
//! is constructed; malformed shapes abort construction immediately.

use crate::cursor::{CursorClassError, CursorRegistry};
use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical connection description produced by normalization.
///
/// `dsn` is always non-empty after normalization; `user` and `password`
/// default to the empty string when the caller omitted them. Any further
/// driver-specific keys are carried verbatim in `options`. Serialization
/// round-trips as a flat mapping, so normalizing an already-canonical
/// mapping is the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub dsn: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ConnectionSpec {
    /// Option key naming the cursor class to use for this model.
    pub const CURSOR_CLASS_KEY: &'static str = "cursor_class";

    /// The `cursor_class` option, when present and a string.
    #[must_use]
    pub fn cursor_class(&self) -> Option<&str> {
        self.options
            .get(Self::CURSOR_CLASS_KEY)
            .and_then(Value::as_str)
    }
}

/// Normalizes heterogeneous connect-info values into a [`ConnectionSpec`].
///
/// When built with a [`CursorRegistry`], a `cursor_class` option is resolved
/// against it (requiring the cache-clearable capability) as part of
/// normalization; without a registry any `cursor_class` request fails.
#[derive(Default)]
pub struct ConnectInfoNormalizer<'a> {
    cursors: Option<&'a CursorRegistry>,
}

impl<'a> ConnectInfoNormalizer<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { cursors: None }
    }

    /// Validate `cursor_class` options against `cursors` during normalization.
    #[must_use]
    pub fn with_registry(cursors: &'a CursorRegistry) -> Self {
        Self {
            cursors: Some(cursors),
        }
    }

    /// Normalize `raw` into the canonical spec.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConnectInfo` when the input shape does not
    /// match one of the accepted forms, and `ModelError::CursorClassLoad`
    /// when a requested `cursor_class` cannot be resolved.
    pub fn normalize(&self, raw: &Value) -> Result<ConnectionSpec> {
        let spec = normalize_shape(raw)?;

        if spec.dsn.is_empty() {
            return Err(ModelError::InvalidConnectInfo(
                "missing or empty 'dsn'".to_owned(),
            ));
        }

        if let Some(class) = spec.cursor_class() {
            match self.cursors {
                Some(registry) => {
                    registry.resolve_clearable(class)?;
                }
                None => {
                    return Err(CursorClassError::Unregistered(class.to_owned()).into());
                }
            }
        }

        Ok(spec)
    }
}

fn normalize_shape(raw: &Value) -> Result<ConnectionSpec> {
    match raw {
        // (a) bare DSN string
        Value::String(dsn) => Ok(ConnectionSpec {
            dsn: dsn.clone(),
            ..ConnectionSpec::default()
        }),
        // (c) single mapping used directly as the option set
        Value::Object(map) => from_option_set(map),
        Value::Array(items) => match items.as_slice() {
            // (d) one-element sequence holding a mapping, same as (c)
            [Value::Object(map)] => from_option_set(map),
            [Value::Object(_), ..] => Err(ModelError::InvalidConnectInfo(
                "a sequence with a leading mapping must have exactly one element".to_owned(),
            )),
            // (b) positional form
            items => from_positional(items),
        },
        other => Err(ModelError::InvalidConnectInfo(format!(
            "expected a string, sequence, or mapping, got {}",
            json_type(other)
        ))),
    }
}

/// Positional form: up to three leading strings (`dsn`, `user`, `password`),
/// then up to two option mappings merged in order (later wins on conflict).
/// Reserved keys in a merged mapping override the positional values.
fn from_positional(items: &[Value]) -> Result<ConnectionSpec> {
    let mut spec = ConnectionSpec::default();
    let mut idx = 0;

    for field in 0..3 {
        match items.get(idx) {
            Some(Value::String(s)) => {
                match field {
                    0 => spec.dsn = s.clone(),
                    1 => spec.user = s.clone(),
                    _ => spec.password = s.clone(),
                }
                idx += 1;
            }
            // A mapping terminates the scalar prefix.
            Some(Value::Object(_)) | None => break,
            Some(other) => {
                return Err(ModelError::InvalidConnectInfo(format!(
                    "positional element {idx} must be a string, got {}",
                    json_type(other)
                )));
            }
        }
    }

    let mut merged = 0;
    while merged < 2 {
        match items.get(idx) {
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    merge_entry(&mut spec, key, value)?;
                }
                idx += 1;
                merged += 1;
            }
            Some(other) => {
                return Err(ModelError::InvalidConnectInfo(format!(
                    "positional element {idx} must be an option mapping, got {}",
                    json_type(other)
                )));
            }
            None => break,
        }
    }

    if idx < items.len() {
        return Err(ModelError::InvalidConnectInfo(format!(
            "{} trailing unconsumed element(s)",
            items.len() - idx
        )));
    }

    Ok(spec)
}

/// Mapping form: `dsn`/`user`/`password` entries become the fixed fields,
/// everything else is carried as a driver option.
fn from_option_set(map: &Map<String, Value>) -> Result<ConnectionSpec> {
    let mut spec = ConnectionSpec::default();

    for (key, value) in map {
        merge_entry(&mut spec, key, value)?;
    }

    Ok(spec)
}

/// Route one mapping entry into the spec: reserved keys land in the fixed
/// fields (replacing whatever was there), everything else is a driver option.
fn merge_entry(spec: &mut ConnectionSpec, key: &str, value: &Value) -> Result<()> {
    match key {
        "dsn" => spec.dsn = require_string(key, value)?,
        "user" => spec.user = require_string(key, value)?,
        "password" => spec.password = require_string(key, value)?,
        _ => {
            spec.options.insert(key.to_owned(), value.clone());
        }
    }
    Ok(())
}

fn require_string(key: &str, value: &Value) -> Result<String> {
    value.as_str().map(ToOwned::to_owned).ok_or_else(|| {
        ModelError::InvalidConnectInfo(format!(
            "'{key}' must be a string, got {}",
            json_type(value)
        ))
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
