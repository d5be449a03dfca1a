//! Raw string key/value backing stores
//!
//! - `MemoryStore`: shared in-process map, clones see the same entries
//! - `FileStore`: JSON file on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (WASM only)

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::persistence::namespace::KEY_SEPARATOR;

/// Minimal contract a backing store must honor.
///
/// Each `put` must be durable on its own; no multi-key transactions.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove every entry whose key lives under `namespace`
    fn remove_all(&self, namespace: &str) -> Result<()>;

    /// Entries under `namespace`, keyed by logical key, in key order
    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>>;
}

macro_rules! forward_store {
    ($($ptr:ty),*) => {$(
        impl<S: KeyValueStore + ?Sized> KeyValueStore for $ptr {
            fn get(&self, key: &str) -> Result<Option<String>> {
                (**self).get(key)
            }

            fn put(&self, key: &str, value: &str) -> Result<()> {
                (**self).put(key, value)
            }

            fn remove_all(&self, namespace: &str) -> Result<()> {
                (**self).remove_all(namespace)
            }

            fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>> {
                (**self).entries(namespace)
            }
        }
    )*};
}

forward_store!(&S, Rc<S>, Box<S>);

fn namespace_prefix(namespace: &str) -> String {
    format!("{namespace}{KEY_SEPARATOR}")
}

fn entries_under(map: &BTreeMap<String, String>, namespace: &str) -> Vec<(String, String)> {
    let prefix = namespace_prefix(namespace);
    map.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .map(|logical| (logical.to_owned(), value.clone()))
        })
        .collect()
}

/// In-memory store. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_all(&self, namespace: &str) -> Result<()> {
        let prefix = namespace_prefix(namespace);
        self.entries
            .borrow_mut()
            .retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>> {
        Ok(entries_under(&self.entries.borrow(), namespace))
    }
}

/// JSON-file-backed store holding a flat `{storage_key: text}` map.
///
/// Nothing is cached: every operation reads the file, so any number of
/// stores opened on one path see the same entries. Changes are written via
/// a temp file + rename, so a crash or failed write leaves the old file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, creating an empty file if missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self { path };
        let entries = store.read_map()?;
        if !store.path.exists() {
            store.write_map(&entries)?;
        }
        log::info!(
            "Opened file store {} ({} entries)",
            store.path.display(),
            entries.len()
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current map on disk; a missing file is an empty map
    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::Store(format!("corrupt store file {}: {e}", self.path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_map(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_map()?;
        let previous = entries.insert(key.to_owned(), value.to_owned());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.write_map(&entries)
    }

    fn remove_all(&self, namespace: &str) -> Result<()> {
        let prefix = namespace_prefix(namespace);
        let mut entries = self.read_map()?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        if entries.len() == before {
            return Ok(());
        }
        self.write_map(&entries)
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>> {
        Ok(entries_under(&self.read_map()?, namespace))
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn open() -> Result<Self> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|storage| Self { storage })
            .ok_or_else(|| Error::Store("LocalStorage unavailable".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> Error {
    Error::Store(format!("{err:?}"))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_all(&self, namespace: &str) -> Result<()> {
        let prefix = namespace_prefix(namespace);
        let len = self.storage.length().map_err(js_error)?;

        // Collect first: removing while indexing shifts the key order
        let mut doomed = Vec::new();
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(js_error)? {
                if key.starts_with(&prefix) {
                    doomed.push(key);
                }
            }
        }
        for key in &doomed {
            self.storage.remove_item(key).map_err(js_error)?;
        }
        Ok(())
    }

    fn entries(&self, namespace: &str) -> Result<Vec<(String, String)>> {
        let len = self.storage.length().map_err(js_error)?;
        let mut map = BTreeMap::new();
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(js_error)? {
                if let Some(value) = self.storage.get_item(&key).map_err(js_error)? {
                    map.insert(key, value);
                }
            }
        }
        Ok(entries_under(&map, namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("prefstore_{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.put("ns/foo", "1").unwrap();
        assert_eq!(b.get("ns/foo").unwrap().as_deref(), Some("1"));
        assert_eq!(b.len(), 1);
        assert_eq!(
            b.entries("ns").unwrap(),
            vec![("foo".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_remove_all_only_touches_namespace() {
        let store = MemoryStore::new();
        store.put("ns/a", "1").unwrap();
        store.put("ns/b", "2").unwrap();
        store.put("nsx/a", "3").unwrap();
        store.put("other/a", "4").unwrap();

        store.remove_all("ns").unwrap();
        assert_eq!(store.get("ns/a").unwrap(), None);
        assert_eq!(store.get("ns/b").unwrap(), None);
        assert_eq!(store.get("nsx/a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get("other/a").unwrap().as_deref(), Some("4"));

        // clearing an empty namespace is fine
        store.remove_all("ns").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let path = temp_path();
        {
            let store = FileStore::open(&path).unwrap();
            assert!(store.entries("ns").unwrap().is_empty());
            store.put("ns/a", "\"x\"").unwrap();
            store.put("ns/b", "2").unwrap();
            store.put("other/a", "3").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("ns/a").unwrap().as_deref(), Some("\"x\""));
        assert_eq!(
            reopened.entries("ns").unwrap(),
            vec![
                ("a".to_string(), "\"x\"".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );

        reopened.remove_all("ns").unwrap();
        let again = FileStore::open(&path).unwrap();
        assert!(again.entries("ns").unwrap().is_empty());
        assert_eq!(again.get("other/a").unwrap().as_deref(), Some("3"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path();
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(Error::Store(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_stores_on_one_path_share_entries() {
        let path = temp_path();
        let a = FileStore::open(&path).unwrap();
        let b = FileStore::open(&path).unwrap();

        a.put("ns/x", "1").unwrap();
        b.put("ns/y", "2").unwrap();
        assert_eq!(b.get("ns/x").unwrap().as_deref(), Some("1"));
        assert_eq!(a.get("ns/y").unwrap().as_deref(), Some("2"));

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("ns/x").unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.get("ns/y").unwrap().as_deref(), Some("2"));

        b.remove_all("ns").unwrap();
        assert_eq!(a.get("ns/x").unwrap(), None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_failed_write_changes_nothing() {
        let path = temp_path();
        let store = FileStore::open(&path).unwrap();
        store.put("ns/kept", "1").unwrap();

        // a directory where the temp file goes makes every write fail
        let tmp = path.with_extension("tmp");
        fs::create_dir(&tmp).unwrap();

        assert!(matches!(store.put("ns/new", "2"), Err(Error::Io(_))));
        assert_eq!(store.get("ns/new").unwrap(), None);

        assert!(store.remove_all("ns").is_err());
        assert_eq!(store.get("ns/kept").unwrap().as_deref(), Some("1"));

        fs::remove_dir(&tmp).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("ns/new").unwrap(), None);
        assert_eq!(reopened.get("ns/kept").unwrap().as_deref(), Some("1"));

        let _ = fs::remove_file(&path);
    }
}
