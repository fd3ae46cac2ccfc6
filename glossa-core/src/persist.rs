//! Durable storage for the user's locale selection.
//!
//! Persistence is best-effort: every operation returns a `Result` that the
//! locale state logs and otherwise discards.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::error::PersistError;

/// A key-value store holding the persisted locale selection.
pub trait SelectionStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Used when no persistence is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSelectionStore;

impl SelectionStore for NoopSelectionStore {
    fn read(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        self
    }
}

impl SelectionStore for MemorySelectionStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A TOML table on disk. Writing one key keeps the others.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_table(&self) -> Result<toml::Table, PersistError> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }
}

impl SelectionStore for FileSelectionStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let table = self.read_table()?;
        Ok(table.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&table)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemorySelectionStore::new().with("lang", "en");
        assert_eq!(store.read("lang").unwrap().as_deref(), Some("en"));
        store.write("lang", "uk").unwrap();
        assert_eq!(store.read("lang").unwrap().as_deref(), Some("uk"));
        assert_eq!(store.read("other").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "theme = \"dark\"\n").unwrap();

        let store = FileSelectionStore::new(&path);
        assert_eq!(store.read("glossa_lang").unwrap(), None);

        store.write("glossa_lang", "en").unwrap();
        assert_eq!(store.read("glossa_lang").unwrap().as_deref(), Some("en"));
        assert_eq!(store.read("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSelectionStore::new(dir.path().join("absent.toml"));
        assert_eq!(store.read("glossa_lang").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "glossa_lang = ").unwrap();

        let store = FileSelectionStore::new(&path);
        assert!(matches!(store.read("glossa_lang"), Err(PersistError::Decode(_))));
        assert!(store.write("glossa_lang", "en").is_err());
    }
}
