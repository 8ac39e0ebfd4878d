//! The mutable record threaded through one dispatch.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::definitions::HookType;

/// Context passed to every handler of a dispatch.
///
/// The caller seeds `data`; handlers add or overwrite keys. The same
/// instance is handed down the whole chain and returned by
/// [`HookManager::dispatch`](crate::HookManager::dispatch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookContext {
    /// The hook type being dispatched.
    pub hook: HookType,
    /// Identifier of this dispatch, used to correlate log lines.
    pub dispatch_id: Uuid,
    /// When the context was created.
    pub timestamp: DateTime<Utc>,
    /// Free-form keyed data.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl HookContext {
    /// Creates an empty context for a hook type.
    pub fn new(hook: HookType) -> Self {
        Self {
            hook,
            dispatch_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            data: Map::new(),
        }
    }

    /// Creates a context seeded with the entries of a JSON object.
    ///
    /// Non-object values are stored under the `"input"` key.
    pub fn from_value(hook: HookType, value: Value) -> Self {
        let mut ctx = Self::new(hook);
        match value {
            Value::Object(map) => ctx.data = map,
            Value::Null => {}
            other => {
                ctx.data.insert("input".to_string(), other);
            }
        }
        ctx
    }

    /// Inserts a value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Inserts a string value.
    pub fn with_string(self, key: &str, value: impl Into<String>) -> Self {
        self.with_data(key, Value::String(value.into()))
    }

    /// Inserts a path value.
    pub fn with_path(self, key: &str, value: impl Into<PathBuf>) -> Self {
        let path: PathBuf = value.into();
        self.with_string(key, path.to_string_lossy())
    }

    /// Inserts a boolean value.
    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with_data(key, Value::Bool(value))
    }

    /// Adds or overwrites a key.
    pub fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Serializes `value` and stores it under `key`.
    pub fn set_serialized<T: Serialize>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    /// Gets a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Gets a non-empty string value as a path.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_str(key)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Gets a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Gets an integer value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// Deserializes the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_deserialized<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, serde_json::Error> {
        self.data
            .get(key)
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
    }

    /// Returns whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }
}
