//! Durable key-value slots holding the user's planner state.
//!
//! Two named JSON slots are used (progress and bucket assignments). Each
//! mutation writes only the slot it touches, so slots never need to be
//! written together.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐
//! │ Store<S>     │────>│ KeyValueStore    │
//! │ JSON encode  │     │  FileStore       │  <dir>/<key>.json, atomic + locked
//! │ load/save    │     │  MemoryStore     │  in-process, counts writes
//! └──────────────┘     └──────────────────┘
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{IntoPlanError, Result};

/// Slot file extension.
const SLOT_SUFFIX: &str = ".json";

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Lock file suffix for concurrent access prevention.
const LOCK_SUFFIX: &str = ".lock";

// ============================================================================
// Backend trait
// ============================================================================

/// Raw string storage addressed by key.
pub trait KeyValueStore {
    /// Read a slot. `Ok(None)` when the slot was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ============================================================================
// File backend
// ============================================================================

/// Slots stored as one JSON file each inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of a slot file.
    #[must_use]
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{SLOT_SUFFIX}"))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{SLOT_SUFFIX}{TMP_SUFFIX}"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{SLOT_SUFFIX}{LOCK_SUFFIX}"))
    }

    fn lock_exclusive(&self, key: &str) -> Result<File> {
        fs::create_dir_all(&self.dir)?;
        let lock_file = File::create(self.lock_path(key))?;
        FileExt::lock_exclusive(&lock_file).into_plan_storage("Failed to acquire slot lock")?;
        Ok(lock_file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);

        let lock_path = self.lock_path(key);
        let _lock = if lock_path.exists() {
            let lock_file = File::open(&lock_path)?;
            FileExt::lock_shared(&lock_file).into_plan_storage("Failed to acquire slot lock")?;
            Some(lock_file)
        } else {
            None
        };

        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(Some(contents))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _lock = self.lock_exclusive(key)?;

        let tmp_path = self.tmp_path(key);
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;

        fs::rename(&tmp_path, self.slot_path(key))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(());
        }
        let _lock = self.lock_exclusive(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// In-process store for tests and benchmarks.
///
/// # Example
///
/// ```
/// use matura_plan::storage::{KeyValueStore, MemoryStore};
///
/// let mut store = MemoryStore::new();
/// store.set("slot", "{}").unwrap();
/// assert_eq!(store.get("slot").unwrap().as_deref(), Some("{}"));
/// assert_eq!(store.write_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot without counting it as a write.
    #[must_use]
    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set` and `remove` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes += 1;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.writes += 1;
        self.slots.remove(key);
        Ok(())
    }
}

// ============================================================================
// JSON slot layer
// ============================================================================

/// JSON-encoded slots on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct Store<S> {
    backend: S,
}

impl<S: KeyValueStore> Store<S> {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Access the backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read and decode a slot.
    ///
    /// Returns `Ok(None)` for an absent or blank slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the content does not decode.
    pub fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            debug!("Slot '{}' is empty", key);
            return Ok(None);
        };
        if raw.trim().is_empty() {
            debug!("Slot '{}' is blank", key);
            return Ok(None);
        }
        let value = serde_json::from_str(&raw)?;
        Ok(Some(value))
    }

    /// Read a slot, falling back when it is absent or unusable.
    ///
    /// Decode and read failures are logged and never returned.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(e) => {
                warn!("Ignoring unreadable slot '{}': {}. Using default.", key, e);
                fallback
            }
        }
    }

    /// Encode and write a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)?;
        debug!("Saved slot '{}' ({} bytes)", key, json.len());
        Ok(())
    }

    /// Delete a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn clear(&mut self, key: &str) -> Result<()> {
        self.backend.remove(key)?;
        debug!("Cleared slot '{}'", key);
        Ok(())
    }
}
