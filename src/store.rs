//! Key-value persistence boundary
//!
//! Preference entries read and write through the [`PrefStore`] trait; the
//! store handle is passed explicitly per call so nothing in the model caches
//! a possibly-stale reference. Reads never fail: a missing or mistyped value
//! yields None and the entry keeps its in-memory default.
//!
//! Two implementations are provided: [`MemoryStore`] for tests and transient
//! use, and [`FileStore`] which persists one JSON file per namespace and
//! commits explicitly, in the same load/save shape as any other config file
//! in this crate's lineage.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One persisted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Opaque get/put boundary for one persistence namespace
pub trait PrefStore {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_int(&self, key: &str) -> Option<i64>;
    fn get_string(&self, key: &str) -> Option<String>;

    fn put_bool(&mut self, key: &str, value: bool);
    fn put_int(&mut self, key: &str, value: i64);
    fn put_string(&mut self, key: &str, value: &str);

    /// True if any value is stored under `key`, regardless of its type
    fn contains(&self, key: &str) -> bool;
}

/// Plain in-memory store
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(flatten)]
    values: HashMap<String, StoreValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PrefStore for MemoryStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(StoreValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(StoreValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some(StoreValue::Str(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), StoreValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoreValue::Int(value));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), StoreValue::Str(value.to_string()));
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// JSON-file-backed store, one file per namespace
///
/// Writes accumulate in memory; nothing touches disk until [`commit`] is
/// called. Callers own the commit, matching the group-level save contract.
///
/// [`commit`]: FileStore::commit
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: MemoryStore,
}

impl FileStore {
    /// Open the store for `namespace` in the default config location
    pub fn open(namespace: &str) -> Self {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(format!("{namespace}.json"));
        Self::open_path(path)
    }

    /// Open the store backed by an explicit file path
    pub fn open_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<MemoryStore>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse store file, starting empty");
                    MemoryStore::new()
                }
            },
            Err(_) => MemoryStore::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all values to disk
    pub fn commit(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create store directory: {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize store values")?;
        fs::write(&self.path, contents)
            .context(format!("Failed to write store file to {}", self.path.display()))?;
        info!(path = %self.path.display(), entries = self.values.len(), "Committed store");
        Ok(())
    }
}

impl PrefStore for FileStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get_bool(key)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get_int(key)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get_string(key)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.values.put_bool(key, value);
    }

    fn put_int(&mut self, key: &str, value: i64) {
        self.values.put_int(key, value);
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.values.put_string(key, value);
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("prefkit_test_{}_{}.json", std::process::id(), name));
        path
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.put_bool("enabled", true);
        store.put_int("quality", 2);
        store.put_string("quality_display", "High");

        assert_eq!(store.get_bool("enabled"), Some(true));
        assert_eq!(store.get_int("quality"), Some(2));
        assert_eq!(store.get_string("quality_display"), Some("High".to_string()));
        assert!(store.contains("enabled"));
        assert!(!store.contains("missing"));
    }

    #[test]
    fn test_memory_store_type_mismatch_is_none() {
        let mut store = MemoryStore::new();
        store.put_int("quality", 2);

        assert_eq!(store.get_bool("quality"), None);
        assert_eq!(store.get_string("quality"), None);
        assert!(store.contains("quality"));
    }

    #[test]
    fn test_put_overwrites_existing_value() {
        let mut store = MemoryStore::new();
        store.put_int("quality", 1);
        store.put_int("quality", 2);
        assert_eq!(store.get_int("quality"), Some(2));

        // Overwrite may also change the value's type
        store.put_string("quality", "two");
        assert_eq!(store.get_int("quality"), None);
        assert_eq!(store.get_string("quality"), Some("two".to_string()));
    }

    #[test]
    fn test_file_store_commit_and_reopen() {
        let path = temp_store_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut store = FileStore::open_path(&path);
        store.put_bool("enabled", true);
        store.put_int("quality", 1);
        store.put_string("quality_display", "Medium");
        store.commit().unwrap();

        let reopened = FileStore::open_path(&path);
        assert_eq!(reopened.get_bool("enabled"), Some(true));
        assert_eq!(reopened.get_int("quality"), Some(1));
        assert_eq!(
            reopened.get_string("quality_display"),
            Some("Medium".to_string())
        );

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_missing_file_starts_empty() {
        let path = temp_store_path("missing");
        let _ = fs::remove_file(&path);

        let store = FileStore::open_path(&path);
        assert_eq!(store.get_bool("anything"), None);
        assert!(!store.contains("anything"));
    }

    #[test]
    fn test_file_store_corrupt_file_starts_empty() {
        let path = temp_store_path("corrupt");
        fs::write(&path, "not json {").unwrap();

        let store = FileStore::open_path(&path);
        assert!(!store.contains("anything"));

        let _ = fs::remove_file(&path);
    }
}
