//! Key-value blob stores
//!
//! A bucket is a named key holding one serialized collection. [`FileStore`]
//! keeps each bucket in `{root}/{key}.json`; [`MemoryStore`] keeps them in a
//! map and is used by tests.
//!
//! Writers are serialized per store: an in-process mutex orders writes from
//! the same process, and an `fs2` lock on `{key}.lock` orders writes across
//! processes. Saves therefore complete in the order they were issued.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs2::FileExt;
use thiserror::Error;

/// Well-known buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// `List[]`
    ShoppingLists,
    /// `GroupList[]`
    GroupLists,
    /// `Group[]` from before lists existed; read and clear only
    LegacyGroups,
}

impl Bucket {
    pub fn key(&self) -> &'static str {
        match self {
            Bucket::ShoppingLists => "shopping_lists",
            Bucket::GroupLists => "group_lists",
            Bucket::LegacyGroups => "shopping_list_groups",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on bucket '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to lock bucket '{key}': {source}")]
    Lock {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed data in bucket '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize bucket '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Flat get/set/remove store addressed by bucket key
pub trait KvStore: Send + Sync {
    /// Returns the raw value, or `None` if the bucket is absent
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the bucket with `value`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes the bucket; deleting an absent bucket is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Read-modify-write under the bucket's writer lock
    ///
    /// `f` receives the current value and returns the value to store.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<String, StoreError>,
    ) -> Result<(), StoreError>;
}

/// Bucket store backed by one JSON file per key
pub struct FileStore {
    root: PathBuf,
    writers: Mutex<()>,
}

impl FileStore {
    /// Creates a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writers: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn bucket_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.lock", key))
    }

    fn io_err(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            key: key.to_string(),
            source,
        }
    }

    fn open_lock(&self, key: &str) -> Result<File, StoreError> {
        fs::create_dir_all(&self.root).map_err(Self::io_err(key))?;
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(key))
            .map_err(Self::io_err(key))
    }

    fn read_unlocked(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.bucket_path(key);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_err(key)(e)),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(Self::io_err(key))?;
        Ok(Some(content))
    }

    fn write_unlocked(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.bucket_path(key);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(Self::io_err(key))?;

            file.write_all(value.as_bytes())
                .map_err(Self::io_err(key))?;
            file.sync_all().map_err(Self::io_err(key))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(Self::io_err(key))
    }

    fn lock_exclusive(&self, key: &str) -> Result<File, StoreError> {
        let lock = self.open_lock(key)?;
        lock.lock_exclusive().map_err(|source| StoreError::Lock {
            key: key.to_string(),
            source,
        })?;
        Ok(lock)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.bucket_path(key).exists() {
            return Ok(None);
        }

        let lock = self.open_lock(key)?;
        lock.lock_shared().map_err(|source| StoreError::Lock {
            key: key.to_string(),
            source,
        })?;

        // Lock is released when `lock` is dropped
        self.read_unlocked(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.lock_exclusive(key)?;
        self.write_unlocked(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.lock_exclusive(key)?;

        match fs::remove_file(self.bucket_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key)(e)),
        }
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<String, StoreError>,
    ) -> Result<(), StoreError> {
        let _guard = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        let _lock = self.lock_exclusive(key)?;

        let current = self.read_unlocked(key)?;
        let next = f(current)?;
        self.write_unlocked(key, &next)
    }
}

/// In-memory bucket store
///
/// Can be switched to a failing mode to simulate storage outages.
#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, String>>,
    failing: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    /// Stores a raw value directly, bypassing serialization
    pub fn put_raw(&self, key: &str, value: &str) {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            Err(StoreError::Unavailable("memory store is failing".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        let buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(buckets.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.put_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<String, StoreError>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let next = f(buckets.get(key).cloned())?;
        buckets.insert(key.to_string(), next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bucket_keys_are_stable() {
        assert_eq!(Bucket::ShoppingLists.key(), "shopping_lists");
        assert_eq!(Bucket::GroupLists.key(), "group_lists");
        assert_eq!(Bucket::LegacyGroups.key(), "shopping_list_groups");
    }

    #[test]
    fn absent_bucket_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store"));

        assert_eq!(store.get("shopping_lists").unwrap(), None);
    }

    #[test]
    fn set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("store"));

        store.set("shopping_lists", "[]").unwrap();

        assert_eq!(store.get("shopping_lists").unwrap().as_deref(), Some("[]"));
        assert!(store.bucket_path("shopping_lists").is_file());
    }

    #[test]
    fn write_is_atomic() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set("group_lists", "[1]").unwrap();
        store.set("group_lists", "[1,2]").unwrap();

        let temp_path = store.bucket_path("group_lists").with_extension("json.tmp");
        assert!(!temp_path.exists());
        assert_eq!(store.get("group_lists").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn remove_deletes_bucket_and_tolerates_absence() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.set("shopping_lists", "[]").unwrap();
        store.remove("shopping_lists").unwrap();
        store.remove("shopping_lists").unwrap();

        assert_eq!(store.get("shopping_lists").unwrap(), None);
    }

    #[test]
    fn update_sees_current_value() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.set("k", "a").unwrap();

        store
            .update("k", &mut |current| Ok(format!("{}b", current.unwrap_or_default())))
            .unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("ab"));
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileStore::new(dir.path()));
        store.set("counter", "0").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .update("counter", &mut |current| {
                                let n: u32 = current.unwrap_or_default().parse().unwrap_or(0);
                                Ok((n + 1).to_string())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("counter").unwrap().as_deref(), Some("80"));
    }

    #[test]
    fn memory_store_failing_mode() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();

        store.set_failing(true);
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));
        assert!(store.set("k", "w").is_err());

        store.set_failing(false);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
