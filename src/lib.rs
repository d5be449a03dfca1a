//! prefstore - typed key/value persistence for UI preferences
//!
//! Core modules:
//! - `codec`: JSON encoding of logical values, witness-guided decoding
//! - `persistence`: namespaced save/load API (`StorageHandler`)
//! - `platform`: backing stores (memory, JSON file, LocalStorage)
//! - `settings`: which store to open and where

pub mod codec;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod settings;

pub use codec::{ConstantSet, EnumConstant, Record, ScalarKind, Schema, Value, Witness};
pub use error::{Error, Result};
pub use persistence::{Namespace, StorageHandler, hash};
pub use platform::{FileStore, KeyValueStore, MemoryStore};
pub use settings::{Backend, StoreSettings};

/// Preference keys and defaults callers rely on
pub mod consts {
    /// Logical keys of the built-in preferences
    pub const SELECTED_CATEGORY: &str = "SELECTED_CATEGORY";
    pub const DIVIDER_POSITION: &str = "DIVIDER_POSITION";
    pub const WINDOW_WIDTH: &str = "WINDOW_WIDTH";
    pub const WINDOW_HEIGHT: &str = "WINDOW_HEIGHT";
    pub const WINDOW_POS_X: &str = "WINDOW_POS_X";
    pub const WINDOW_POS_Y: &str = "WINDOW_POS_Y";

    /// Split between category tree and content (fraction of width)
    pub const DEFAULT_DIVIDER_POSITION: f64 = 0.2;
    /// Window geometry in pixels
    pub const DEFAULT_PREFERENCES_WIDTH: f64 = 1000.0;
    pub const DEFAULT_PREFERENCES_HEIGHT: f64 = 700.0;
    pub const DEFAULT_PREFERENCES_POS_X: f64 = 0.0;
    pub const DEFAULT_PREFERENCES_POS_Y: f64 = 0.0;

    /// Scope used when nothing else is configured
    pub const DEFAULT_SCOPE: &str = "prefstore";
    /// File store location used when nothing else is configured
    pub const DEFAULT_STORE_PATH: &str = "prefstore.json";
}

/// Open the LocalStorage-backed handler for a scope (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn local_storage_handler(scope: &str) -> Result<StorageHandler<platform::LocalStorageStore>> {
    Ok(StorageHandler::new(scope, platform::LocalStorageStore::open()?))
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn wasm_start() {
    platform::init_logging();
    log::info!("prefstore loaded");
}
