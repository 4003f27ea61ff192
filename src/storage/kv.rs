//! Key-value engine seam
//!
//! The record store treats its backing engine as an external ordered map:
//! JSON values keyed by record id within named collections. Two engines
//! ship here: an in-memory map for tests and ephemeral use, and a
//! file-backed engine persisting one JSON file per collection with
//! atomic temp-write-then-rename semantics.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};

/// Ordered key-value storage over JSON values
///
/// Individual get/put/delete calls are serialized by the engine; no
/// cross-record atomicity is provided.
pub trait KvEngine: Send + Sync {
    /// Get one value by id
    fn get(&self, collection: &str, id: &str) -> LedgerResult<Option<Value>>;

    /// Insert or replace one value
    fn put(&self, collection: &str, id: &str, value: Value) -> LedgerResult<()>;

    /// Remove one value; removing a missing id is a no-op
    fn delete(&self, collection: &str, id: &str) -> LedgerResult<()>;

    /// Get every value in a collection, in id order
    fn get_all(&self, collection: &str) -> LedgerResult<Vec<Value>>;
}

/// In-memory engine backed by ordered maps
#[derive(Default)]
pub struct MemoryEngine {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryEngine {
    /// Create an empty in-memory engine
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvEngine for MemoryEngine {
    fn get(&self, collection: &str, id: &str) -> LedgerResult<Option<Value>> {
        let guard = self
            .collections
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;
        Ok(guard.get(collection).and_then(|c| c.get(id)).cloned())
    }

    fn put(&self, collection: &str, id: &str, value: Value) -> LedgerResult<()> {
        let mut guard = self
            .collections
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> LedgerResult<()> {
        let mut guard = self
            .collections
            .write()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire write lock: {}", e)))?;
        if let Some(c) = guard.get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    fn get_all(&self, collection: &str) -> LedgerResult<Vec<Value>> {
        let guard = self
            .collections
            .read()
            .map_err(|e| LedgerError::Storage(format!("failed to acquire read lock: {}", e)))?;
        Ok(guard
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// File-backed engine: one JSON file per collection
pub struct FileEngine {
    data_dir: PathBuf,
    // Serializes read-modify-write cycles across collections.
    lock: RwLock<()>,
}

impl FileEngine {
    /// Create a file engine rooted at the given data directory
    pub fn new(data_dir: PathBuf) -> LedgerResult<Self> {
        fs::create_dir_all(&data_dir).map_err(|e| {
            LedgerError::Storage(format!(
                "failed to create directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            data_dir,
            lock: RwLock::new(()),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection))
    }

    fn read_map(path: &Path) -> LedgerResult<BTreeMap<String, Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let file = File::open(path).map_err(|e| {
            LedgerError::Storage(format!("failed to open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            LedgerError::Storage(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Write atomically: serialize to a temp file in the same directory,
    /// flush, sync, then rename over the target.
    fn write_map(path: &Path, map: &BTreeMap<String, Value>) -> LedgerResult<()> {
        let temp_path = path.with_extension("json.tmp");

        let file = File::create(&temp_path)
            .map_err(|e| LedgerError::Storage(format!("failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, map)
            .map_err(|e| LedgerError::Storage(format!("failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| LedgerError::Storage(format!("failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| LedgerError::Storage(format!("failed to sync data: {}", e)))?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LedgerError::Storage(format!("failed to rename temp file: {}", e))
        })
    }
}

impl KvEngine for FileEngine {
    fn get(&self, collection: &str, id: &str) -> LedgerResult<Option<Value>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        let map = Self::read_map(&self.collection_path(collection))?;
        Ok(map.get(id).cloned())
    }

    fn put(&self, collection: &str, id: &str, value: Value) -> LedgerResult<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let path = self.collection_path(collection);
        let mut map = Self::read_map(&path)?;
        map.insert(id.to_string(), value);
        Self::write_map(&path, &map)
    }

    fn delete(&self, collection: &str, id: &str) -> LedgerResult<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let path = self.collection_path(collection);
        let mut map = Self::read_map(&path)?;
        if map.remove(id).is_some() {
            Self::write_map(&path, &map)?;
        }
        Ok(())
    }

    fn get_all(&self, collection: &str) -> LedgerResult<Vec<Value>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        let map = Self::read_map(&self.collection_path(collection))?;
        Ok(map.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn exercise_engine(engine: &dyn KvEngine) {
        assert!(engine.get("accounts", "a").unwrap().is_none());

        engine.put("accounts", "a", json!({"x": 1})).unwrap();
        engine.put("accounts", "b", json!({"x": 2})).unwrap();
        assert_eq!(engine.get("accounts", "a").unwrap(), Some(json!({"x": 1})));

        let all = engine.get_all("accounts").unwrap();
        assert_eq!(all.len(), 2);

        // Replace in place
        engine.put("accounts", "a", json!({"x": 3})).unwrap();
        assert_eq!(engine.get("accounts", "a").unwrap(), Some(json!({"x": 3})));

        // Idempotent delete
        engine.delete("accounts", "a").unwrap();
        engine.delete("accounts", "a").unwrap();
        assert!(engine.get("accounts", "a").unwrap().is_none());

        // Collections are independent
        assert!(engine.get_all("budgets").unwrap().is_empty());
    }

    #[test]
    fn test_memory_engine() {
        exercise_engine(&MemoryEngine::new());
    }

    #[test]
    fn test_file_engine() {
        let dir = TempDir::new().unwrap();
        let engine = FileEngine::new(dir.path().to_path_buf()).unwrap();
        exercise_engine(&engine);
    }

    #[test]
    fn test_file_engine_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        {
            let engine = FileEngine::new(dir.path().to_path_buf()).unwrap();
            engine.put("accounts", "a", json!({"x": 1})).unwrap();
        }
        let engine = FileEngine::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(engine.get("accounts", "a").unwrap(), Some(json!({"x": 1})));
    }
}
