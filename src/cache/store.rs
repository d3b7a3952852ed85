//! Durable key-value store backing the cache and user preferences
//!
//! A `localStorage`-style store: synchronous get/set/remove of string
//! values, one file per key in an XDG-compliant directory. Values carry no
//! expiry of their own; freshness policy lives in the cache manager.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Durable string store, one file per key
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory where entries are stored
    dir: PathBuf,
}

impl Store {
    /// Opens the store in the XDG cache directory
    ///
    /// Uses `~/.cache/ipoterm/` on Linux, or the platform equivalent.
    /// Returns `None` if the location cannot be determined (e.g. no home
    /// directory).
    pub fn open() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "ipoterm")?;
        let dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Opens the store at a custom directory
    ///
    /// Useful for testing or the `--data-dir` override.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the path of the file holding the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Ensures the store directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` when the key does not exist or cannot be read.
    pub fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    /// Writes `value` under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        fs::write(self.entry_path(key), value)
    }

    /// Removes the value stored under `key`
    ///
    /// Removing a missing key is not an error.
    #[allow(dead_code)]
    pub fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.entry_path(key)) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (Store, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_set_creates_file_in_store_directory() {
        let (store, temp_dir) = create_test_store();

        store.set("test_key", "hello").expect("Set should succeed");

        let expected_path = temp_dir.path().join("test_key");
        assert!(expected_path.exists(), "Store file should exist");
        assert_eq!(
            fs::read_to_string(expected_path).expect("Should read file"),
            "hello"
        );
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.get("nonexistent_key").is_none());
    }

    #[test]
    fn test_get_returns_stored_value() {
        let (store, _temp_dir) = create_test_store();

        store.set("greeting", "namaste").expect("Set should succeed");

        assert_eq!(store.get("greeting").as_deref(), Some("namaste"));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", "first").expect("First set should succeed");
        store.set("key", "second").expect("Second set should succeed");

        assert_eq!(store.get("key").as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_deletes_value() {
        let (store, _temp_dir) = create_test_store();

        store.set("key", "value").expect("Set should succeed");
        store.remove("key").expect("Remove should succeed");

        assert!(store.get("key").is_none());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.remove("never_existed").is_ok());
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("store").join("dir");
        let store = Store::with_dir(nested_path.clone());

        store.set("nested_key", "x").expect("Set should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key").exists(), "Store file should exist");
    }

    #[test]
    fn test_open_creates_xdg_compliant_path() {
        if let Some(store) = Store::open() {
            let path_str = store.dir.to_string_lossy();
            assert!(
                path_str.contains("ipoterm"),
                "Store path should contain project name"
            );
        }
        // Test passes if open() returns None (e.g., no home directory in CI)
    }
}
