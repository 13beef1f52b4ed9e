//! File storage backend
//!
//! Keeps all entries in a single JSON file in the user's data directory.
//! Every operation reads the file afresh, and every mutation rewrites it
//! atomically, so several handles on one directory see each other's writes.
//! Handles in one process are serialized; separate processes are not, and a
//! write landing between another process's read and rename is lost.
//! Values are written as given; the facade hands this store ciphertext only.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::debug;

use super::KeyValueStore;
use crate::error::{Result, StorageError};

const STORE_FILE_NAME: &str = "storage.json";
const STORE_FILE_VERSION: u32 = 1;

/// Serializes file access between handles in this process
static FILE_LOCK: Mutex<()> = Mutex::new(());

/// File format for persistent storage
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

/// JSON-file backed store
#[derive(Debug)]
pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    /// Open the store in the default per-user data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_dir()?)
    }

    /// Open (or create) the store in `storage_dir`
    pub fn open(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir)?;

        let store = Self { storage_dir };
        let entries = store.snapshot()?;
        debug!(
            "File storage opened at {:?} with {} entries",
            store.storage_dir,
            entries.len()
        );

        Ok(store)
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "symbia-labs", "secure-storage")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                StorageError::Storage("Could not determine data directory".to_string())
            })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn storage_file_path(&self) -> PathBuf {
        self.storage_dir.join(STORE_FILE_NAME)
    }

    fn lock() -> Result<MutexGuard<'static, ()>> {
        FILE_LOCK
            .lock()
            .map_err(|_| StorageError::Storage("file store lock poisoned".to_string()))
    }

    fn load(path: &Path) -> Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let contents = std::fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&contents)?;

        if file.version != STORE_FILE_VERSION {
            return Err(StorageError::Storage(format!(
                "Unsupported storage file version: {}",
                file.version
            )));
        }

        Ok(file.entries)
    }

    fn save(&self, entries: HashMap<String, String>) -> Result<()> {
        let count = entries.len();
        let file = StoreFile {
            version: STORE_FILE_VERSION,
            entries,
        };

        let contents = serde_json::to_string_pretty(&file)?;

        // Unique temp file in the same directory, then an atomic rename
        let mut temp = NamedTempFile::new_in(&self.storage_dir)?;
        temp.write_all(contents.as_bytes())?;
        temp.persist(self.storage_file_path())
            .map_err(|e| StorageError::Io(e.error))?;

        debug!("Saved {} entries to storage", count);
        Ok(())
    }

    /// Current entries as found on disk
    fn snapshot(&self) -> Result<HashMap<String, String>> {
        let _guard = Self::lock()?;
        Self::load(&self.storage_file_path())
    }

    /// Reload the entries, apply `change`, and write them back if it reports
    /// a modification. A failed save leaves the file untouched.
    fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let _guard = Self::lock()?;
        let mut entries = Self::load(&self.storage_file_path())?;

        if change(&mut entries) {
            self.save(entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.snapshot()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })?;
        debug!("Stored key: {}", key);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.mutate(|entries| {
            let changed = !entries.is_empty();
            entries.clear();
            changed
        })?;
        debug!("Cleared all entries");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.into_keys().collect())
    }

    fn backend_name(&self) -> &'static str {
        "File Storage"
    }
}
