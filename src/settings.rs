//! Store settings
//!
//! Which backing store to open, where it lives, and the default scope.
//! Read from a JSON file, then overridden by `PREFSTORE_*` environment
//! variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCOPE, DEFAULT_STORE_PATH};
use crate::error::{Error, Result};
use crate::platform::storage::{FileStore, KeyValueStore, MemoryStore};

/// Environment variables consulted by [`StoreSettings::from_env`]
pub const ENV_BACKEND: &str = "PREFSTORE_BACKEND";
pub const ENV_PATH: &str = "PREFSTORE_PATH";
pub const ENV_SCOPE: &str = "PREFSTORE_SCOPE";

/// Backing store kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Process-local, lost on exit
    Memory,
    /// JSON file on disk
    #[default]
    File,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Some(Backend::Memory),
            "file" | "json" => Some(Backend::File),
            _ => None,
        }
    }
}

/// Store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: Backend,
    /// File store location (ignored by the memory backend)
    pub path: PathBuf,
    /// Scope hashed into the namespace
    pub scope: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            path: PathBuf::from(DEFAULT_STORE_PATH),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

impl StoreSettings {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Read settings from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => {
                let settings = serde_json::from_slice(&bytes).map_err(|e| {
                    Error::Deserialization(format!("settings {}: {e}", path.display()))
                })?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Apply overrides from a variable lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_BACKEND) {
            match Backend::parse(&raw) {
                Some(backend) => self.backend = backend,
                None => log::warn!("Ignoring unknown {ENV_BACKEND} value {raw:?}"),
            }
        }
        if let Some(path) = lookup(ENV_PATH).filter(|p| !p.is_empty()) {
            self.path = PathBuf::from(path);
        }
        if let Some(scope) = lookup(ENV_SCOPE).filter(|s| !s.is_empty()) {
            self.scope = scope;
        }
        self
    }

    /// Open the configured backing store
    pub fn open_store(&self) -> Result<Box<dyn KeyValueStore>> {
        log::info!("Opening {} store", self.backend.as_str());
        Ok(match self.backend {
            Backend::Memory => Box::new(MemoryStore::new()),
            Backend::File => Box::new(FileStore::open(&self.path)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::StorageHandler;
    use std::collections::HashMap;

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("Memory"), Some(Backend::Memory));
        assert_eq!(Backend::parse(" json "), Some(Backend::File));
        assert_eq!(Backend::parse("redis"), None);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_BACKEND, "memory"),
            (ENV_PATH, "/tmp/prefs.json"),
            (ENV_SCOPE, "com.example.App"),
        ]
        .into_iter()
        .collect();
        let settings =
            StoreSettings::default().with_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.path, PathBuf::from("/tmp/prefs.json"));
        assert_eq!(settings.scope, "com.example.App");

        let unchanged = StoreSettings::default().with_overrides(|name| {
            (name == ENV_BACKEND).then(|| "redis".to_string())
        });
        assert_eq!(unchanged, StoreSettings::default());
    }

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let path = std::env::temp_dir()
            .join(format!("prefstore_settings_{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, br#"{"backend":"memory"}"#).unwrap();

        let settings = StoreSettings::load(&path).unwrap();
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.scope, DEFAULT_SCOPE);

        settings.save(&path).unwrap();
        assert_eq!(StoreSettings::load(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);

        assert_eq!(StoreSettings::load(&path).unwrap(), StoreSettings::default());
    }

    #[test]
    fn test_open_store_feeds_handler() {
        let settings = StoreSettings {
            backend: Backend::Memory,
            ..Default::default()
        };
        let handler = StorageHandler::new(&settings.scope, settings.open_store().unwrap());
        handler.save_window_height(512.0).unwrap();
        assert_eq!(handler.load_window_height().unwrap(), 512.0);
    }
}
