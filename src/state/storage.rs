//! Durable key-value storage for the persisted application state.
//!
//! The store writes the whole state as one JSON document under a single key.
//! Backends:
//! - [`MemoryStorage`] keeps entries in a map (tests, headless use)
//! - [`FileStorage`] writes one `<key>.json` file per key (native)
//! - [`LocalStorage`] uses the browser's `localStorage` (WASM)

use std::collections::HashMap;

/// A string key-value store.
pub trait StateStorage {
    /// Read the value stored under `key`, `None` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error when reading or writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend can't be reached (no window, storage disabled, quota)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// Direct read access for inspection.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by one JSON file per key inside a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage in the per-user configuration directory.
    /// Returns None if no home or config directory can be determined.
    pub fn default_location() -> Option<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(Self::new(config_dir.join(crate::constants::APP_DIR_NAME)))
        } else {
            dirs::home_dir().map(|home| {
                Self::new(
                    home.join(".config")
                        .join(crate::constants::APP_DIR_NAME),
                )
            })
        }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                log::debug!("📂 Read {} bytes from {:?}", json.len(), path);
                Ok(Some(json))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        std::fs::write(&path, value)?;
        log::debug!("💾 Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object available".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl StateStorage for LocalStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("Failed to read localStorage: {:?}", e)))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(format!("Failed to write localStorage: {:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load("k").unwrap().is_none());
        storage.save("k", "v1").unwrap();
        storage.save("k", "v2").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.get("k"), Some("v2"));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested"));
        assert!(storage.load("measurementCalculator").unwrap().is_none());

        storage.save("measurementCalculator", "{\"pieces\":[]}").unwrap();
        assert!(dir.path().join("nested/measurementCalculator.json").exists());
        assert_eq!(
            storage.load("measurementCalculator").unwrap().as_deref(),
            Some("{\"pieces\":[]}")
        );
    }

    #[test]
    fn test_file_storage_keys_are_separate() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.save("a", "1").unwrap();
        storage.save("b", "2").unwrap();
        assert_eq!(storage.load("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.load("b").unwrap().as_deref(), Some("2"));
    }
}
