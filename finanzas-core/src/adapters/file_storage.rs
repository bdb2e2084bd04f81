//! File-backed storage adapter
//!
//! Persists entries as a flat JSON object in `<app_dir>/session.json`:
//! ```json
//! { "token": "...", "refreshToken": "...", "user": "{\"id\":7,...}" }
//! ```
//! Every write is a read-modify-write under an exclusive advisory lock on
//! `session.lock`, finished with an atomic rename so readers never observe a
//! half-written file.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStorage;

const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "session.lock";

type Entries = BTreeMap<String, String>;

/// Durable storage in the application directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for the session file, creating it if needed
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the session file
    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn open_lock(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(lock)
    }

    fn read_entries(&self) -> Result<Entries> {
        let path = self.path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = std::fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("Corrupt session file {}: {}", path.display(), e))
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.path())
            .map_err(|e| Error::storage(format!("Failed to persist session file: {}", e)))?;

        Ok(())
    }

    /// Apply `f` to the entries while holding the exclusive lock
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries) -> bool,
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_entries().and_then(|mut entries| {
            if f(&mut entries) {
                self.write_entries(&entries)
            } else {
                Ok(())
            }
        });

        let _ = lock.unlock();
        result
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let entries = self.read_entries();
        let _ = lock.unlock();
        Ok(entries?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
