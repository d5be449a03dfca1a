//! Save/load of preferences under a hashed namespace
//!
//! Features:
//! - SHA-256 namespace per owner scope
//! - Window geometry and selected-category shortcuts
//! - Generic objects and lists, decoded by sample or explicit witness
//! - Typed serde access for callers with static types

pub mod namespace;

pub use namespace::{Namespace, hash};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::{self, Value, Witness};
use crate::consts::*;
use crate::error::{Error, Result};
use crate::platform::storage::{KeyValueStore, MemoryStore};

/// Save/load API over a namespaced backing store.
///
/// Holds no locks: callers own synchronization of any single key.
#[derive(Debug, Clone)]
pub struct StorageHandler<S: KeyValueStore = MemoryStore> {
    store: S,
    namespace: Namespace,
}

impl<S: KeyValueStore> StorageHandler<S> {
    /// Handler whose entries live under `hash(scope)`
    pub fn new(scope: &str, store: S) -> Self {
        let namespace = Namespace::for_scope(scope);
        log::debug!("Storage handler for scope {scope:?} -> {namespace}");
        Self { store, namespace }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let storage_key = self.namespace.key(key);
        let text = self.store.get(&storage_key)?;
        log::debug!(
            "get {storage_key} -> {}",
            if text.is_some() { "hit" } else { "absent" }
        );
        Ok(text)
    }

    fn write(&self, key: &str, text: &str) -> Result<()> {
        let storage_key = self.namespace.key(key);
        log::debug!("put {storage_key} ({} bytes)", text.len());
        self.store.put(&storage_key, text)
    }

    // === Selected category ===

    pub fn save_selected_category(&self, name: &str) -> Result<()> {
        self.save_object(SELECTED_CATEGORY, &Value::from(name))
    }

    /// Last saved category, `None` when nothing was saved
    pub fn load_selected_category(&self) -> Result<Option<String>> {
        match self.load_object_as(SELECTED_CATEGORY, &Witness::string(), Value::Null)? {
            Value::Str(name) => Ok(Some(name)),
            _ => Ok(None),
        }
    }

    // === Window geometry ===

    pub fn save_divider_position(&self, position: f64) -> Result<()> {
        self.save_f64(DIVIDER_POSITION, position)
    }

    pub fn load_divider_position(&self) -> Result<f64> {
        self.load_f64(DIVIDER_POSITION, DEFAULT_DIVIDER_POSITION)
    }

    pub fn save_window_width(&self, width: f64) -> Result<()> {
        self.save_f64(WINDOW_WIDTH, width)
    }

    pub fn load_window_width(&self) -> Result<f64> {
        self.load_f64(WINDOW_WIDTH, DEFAULT_PREFERENCES_WIDTH)
    }

    pub fn save_window_height(&self, height: f64) -> Result<()> {
        self.save_f64(WINDOW_HEIGHT, height)
    }

    pub fn load_window_height(&self) -> Result<f64> {
        self.load_f64(WINDOW_HEIGHT, DEFAULT_PREFERENCES_HEIGHT)
    }

    pub fn save_window_pos_x(&self, x: f64) -> Result<()> {
        self.save_f64(WINDOW_POS_X, x)
    }

    pub fn load_window_pos_x(&self) -> Result<f64> {
        self.load_f64(WINDOW_POS_X, DEFAULT_PREFERENCES_POS_X)
    }

    pub fn save_window_pos_y(&self, y: f64) -> Result<()> {
        self.save_f64(WINDOW_POS_Y, y)
    }

    pub fn load_window_pos_y(&self) -> Result<f64> {
        self.load_f64(WINDOW_POS_Y, DEFAULT_PREFERENCES_POS_Y)
    }

    fn save_f64(&self, key: &str, value: f64) -> Result<()> {
        self.save_object(key, &Value::Float(value))
    }

    fn load_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.load_object_as(key, &Witness::float(), Value::Float(default))? {
            Value::Float(value) => Ok(value),
            // stored null
            _ => Ok(default),
        }
    }

    // === Generic objects ===

    /// Encode and store any value, sequences included
    pub fn save_object(&self, key: &str, value: &Value) -> Result<()> {
        let text = codec::encode(value)?;
        self.write(key, &text)
    }

    /// Load a value using `default` as the sample witness.
    ///
    /// Absent keys return `default` untouched. Present values that do not fit
    /// the sample's shape are widened rather than rejected.
    pub fn load_object(&self, key: &str, default: Value) -> Result<Value> {
        match self.read(key)? {
            Some(text) => codec::decode_with_sample(&text, &default),
            None => Ok(default),
        }
    }

    /// Load a value with an explicit witness; `default` is only used when absent
    pub fn load_object_as(&self, key: &str, witness: &Witness, default: Value) -> Result<Value> {
        match self.read(key)? {
            Some(text) => codec::decode(&text, witness),
            None => Ok(default),
        }
    }

    // === Lists ===

    /// Store the current contents of a list
    pub fn save_list(&self, key: &str, items: &[Value]) -> Result<()> {
        self.save_object(key, &Value::Seq(items.to_vec()))
    }

    /// Load a list using the first element of `default` as the element sample
    pub fn load_observable_list(&self, key: &str, default: Vec<Value>) -> Result<Vec<Value>> {
        let Some(text) = self.read(key)? else {
            return Ok(default);
        };
        Ok(codec::decode_list_with_sample(&text, &default)?.unwrap_or(default))
    }

    /// Load a list decoding every element with `element`
    pub fn load_observable_list_as(
        &self,
        key: &str,
        element: &Witness,
        default: Vec<Value>,
    ) -> Result<Vec<Value>> {
        let Some(text) = self.read(key)? else {
            return Ok(default);
        };
        Ok(codec::decode_list(&text, element)?.unwrap_or(default))
    }

    // === Typed access ===

    /// Store any serde value in the same wire format
    pub fn save_typed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text =
            serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.write(key, &text)
    }

    /// Load into `T`; the type itself acts as the explicit witness
    pub fn load_typed<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.read(key)? {
            Some(text) => {
                serde_json::from_str(&text).map_err(|e| Error::Deserialization(e.to_string()))
            }
            None => Ok(default),
        }
    }

    // === Housekeeping ===

    /// Remove every entry in this namespace. Returns `false` on store failure.
    pub fn clear_preferences(&self) -> bool {
        match self.store.remove_all(self.namespace.as_str()) {
            Ok(()) => {
                log::info!("Cleared preferences in namespace {}", self.namespace);
                true
            }
            Err(err) => {
                log::warn!("Failed to clear namespace {}: {err}", self.namespace);
                false
            }
        }
    }
}
