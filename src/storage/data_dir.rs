//! Data directory management
//!
//! Resolves the directory holding the bucket files and hands out typed
//! collections over it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use super::bucket::{Bucket, FileStore, KvStore};
use super::collection::Collection;
use crate::domain::{Group, GroupList, List};

#[derive(Debug, Error)]
pub enum DataDirError {
    #[error("Data directory path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// The on-disk home of all buckets
pub struct DataDir {
    root: PathBuf,
    store: Arc<FileStore>,
}

impl DataDir {
    /// Opens (creating if necessary) the data directory at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if root.exists() && !root.is_dir() {
            return Err(DataDirError::NotADirectory(root).into());
        }

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        let store = Arc::new(FileStore::new(&root));
        Ok(Self { root, store })
    }

    /// Returns the data directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    /// Shopping lists (`shopping_lists`)
    pub fn lists(&self) -> Collection<List> {
        Collection::for_bucket(self.store(), Bucket::ShoppingLists)
    }

    /// Group lists (`group_lists`)
    pub fn templates(&self) -> Collection<GroupList> {
        Collection::for_bucket(self.store(), Bucket::GroupLists)
    }

    /// Legacy groups-only bucket (`shopping_list_groups`)
    pub fn legacy_groups(&self) -> Collection<Group> {
        Collection::for_bucket(self.store(), Bucket::LegacyGroups)
    }

    /// Path of the file backing `bucket`
    pub fn bucket_path(&self, bucket: Bucket) -> PathBuf {
        self.store.bucket_path(bucket.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Container;
    use tempfile::TempDir;

    #[test]
    fn open_creates_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("a").join("b");

        let data = DataDir::open(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(data.root(), root);
    }

    #[test]
    fn open_is_idempotent() {
        let dir = TempDir::new().unwrap();

        DataDir::open(dir.path()).unwrap();
        DataDir::open(dir.path()).unwrap();
    }

    #[test]
    fn open_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();

        assert!(DataDir::open(&file).is_err());
    }

    #[test]
    fn collections_share_the_directory() {
        let dir = TempDir::new().unwrap();
        let data = DataDir::open(dir.path()).unwrap();

        data.lists()
            .insert(List::new("l-1".parse().unwrap(), "Weekly".to_string()));

        assert!(data.bucket_path(Bucket::ShoppingLists).is_file());
        assert!(!data.bucket_path(Bucket::GroupLists).exists());
        assert_eq!(data.lists().count(), 1);
        assert!(data.templates().load_all().is_empty());
        assert!(data.legacy_groups().load_all().is_empty());
    }
}
