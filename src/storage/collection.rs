//! Typed collections over a bucket
//!
//! A [`Collection`] serializes a whole `Vec<T>` as one JSON array. The
//! contract-level operations (`load_all`, `save_all`, `insert`, `clear`)
//! never fail: storage errors and malformed data are logged and replaced by
//! an empty collection or a dropped write. The `try_*` variants return the
//! error for callers that want to surface it.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::bucket::{Bucket, KvStore, StoreError};
use crate::domain::{Container, ListId};

/// A JSON-array collection stored under one bucket key
pub struct Collection<T> {
    store: Arc<dyn KvStore>,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Collection for one of the well-known buckets
    pub fn for_bucket(store: Arc<dyn KvStore>, bucket: Bucket) -> Self {
        Self::new(store, bucket.key())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn decode(&self, raw: &str) -> Result<Vec<T>, StoreError> {
        serde_json::from_str(raw).map_err(|source| StoreError::Malformed {
            key: self.key.clone(),
            source,
        })
    }

    fn encode(&self, items: &[T]) -> Result<String, StoreError> {
        serde_json::to_string(items).map_err(|source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        })
    }

    /// Loads every entry; an absent bucket is an empty collection
    pub fn try_load_all(&self) -> Result<Vec<T>, StoreError> {
        match self.store.get(&self.key)? {
            Some(raw) => self.decode(&raw),
            None => Ok(Vec::new()),
        }
    }

    /// Loads every entry, falling back to an empty collection on any error
    pub fn load_all(&self) -> Vec<T> {
        match self.try_load_all() {
            Ok(items) => items,
            Err(e @ StoreError::Malformed { .. }) => {
                warn!(bucket = %self.key, error = %e, "ignoring malformed bucket");
                Vec::new()
            }
            Err(e) => {
                error!(bucket = %self.key, error = %e, "failed to load bucket");
                Vec::new()
            }
        }
    }

    /// Overwrites the bucket with `items`
    pub fn try_save_all(&self, items: &[T]) -> Result<(), StoreError> {
        let raw = self.encode(items)?;
        self.store.set(&self.key, &raw)?;
        debug!(bucket = %self.key, count = items.len(), "saved bucket");
        Ok(())
    }

    /// Overwrites the bucket; failures are logged and dropped
    pub fn save_all(&self, items: &[T]) {
        if let Err(e) = self.try_save_all(items) {
            error!(bucket = %self.key, error = %e, "failed to save bucket");
        }
    }

    /// Appends one entry under the bucket's writer lock
    ///
    /// Malformed existing content is replaced rather than appended to.
    pub fn try_insert(&self, item: T) -> Result<(), StoreError> {
        let mut pending = Some(item);
        self.store.update(&self.key, &mut |current| {
            let mut items = match current {
                Some(raw) => self.decode(&raw).unwrap_or_else(|e| {
                    warn!(bucket = %self.key, error = %e, "replacing malformed bucket");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            items.extend(pending.take());
            self.encode(&items)
        })
    }

    /// Appends one entry; failures are logged and dropped
    pub fn insert(&self, item: T) {
        if let Err(e) = self.try_insert(item) {
            error!(bucket = %self.key, error = %e, "failed to insert into bucket");
        }
    }

    /// Deletes the bucket
    pub fn try_clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }

    /// Deletes the bucket; failures are logged and dropped
    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            error!(bucket = %self.key, error = %e, "failed to clear bucket");
        }
    }

    /// Number of stored entries (0 when unreadable)
    pub fn count(&self) -> usize {
        self.load_all().len()
    }

    /// Sequence number for naming the next entry ("New List 3")
    pub fn next_number(&self) -> usize {
        self.count() + 1
    }
}

impl<T: Container> Collection<T> {
    /// Finds one list by ID, returning the empty sentinel when absent
    pub fn load_by_id(&self, id: &ListId) -> T {
        self.load_all()
            .into_iter()
            .find(|l| l.id() == id)
            .unwrap_or_else(T::empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Group, GroupList, List};
    use crate::storage::bucket::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn list(id: &str, name: &str) -> List {
        List::new(id.parse().unwrap(), name.to_string())
    }

    fn memory() -> (Arc<MemoryStore>, Collection<List>) {
        let store = Arc::new(MemoryStore::new());
        let collection = Collection::for_bucket(store.clone(), Bucket::ShoppingLists);
        (store, collection)
    }

    #[test]
    fn absent_bucket_loads_empty() {
        let (_, lists) = memory();
        assert!(lists.load_all().is_empty());
        assert_eq!(lists.next_number(), 1);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn KvStore> = Arc::new(FileStore::new(dir.path()));
        let lists: Collection<List> = Collection::for_bucket(store, Bucket::ShoppingLists);

        let mut weekly = list("l-1", "Weekly");
        weekly.groups.push(Group::new("g-1".parse().unwrap(), "Produce", 0));
        let saved = vec![weekly, list("l-2", "Party")];

        lists.save_all(&saved);

        assert_eq!(lists.load_all(), saved);
        assert_eq!(lists.count(), 2);
        assert!(dir.path().join("shopping_lists.json").is_file());
    }

    #[test]
    fn malformed_bucket_loads_empty() {
        let (store, lists) = memory();
        store.put_raw("shopping_lists", "{not json");

        assert!(lists.load_all().is_empty());
        assert!(matches!(lists.try_load_all(), Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn load_by_id_returns_sentinel_when_missing() {
        let (_, lists) = memory();
        lists.save_all(&[list("l-1", "Weekly")]);

        assert_eq!(lists.load_by_id(&"l-1".parse().unwrap()).name, "Weekly");

        let missing = lists.load_by_id(&"l-9".parse().unwrap());
        assert!(missing.is_empty_sentinel());
        assert!(missing.groups.is_empty());
    }

    #[test]
    fn insert_appends() {
        let (_, lists) = memory();
        lists.insert(list("l-1", "Weekly"));
        lists.insert(list("l-2", "Party"));

        let names: Vec<_> = lists.load_all().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Weekly", "Party"]);
        assert_eq!(lists.next_number(), 3);
    }

    #[test]
    fn clear_removes_bucket() {
        let (_, lists) = memory();
        lists.save_all(&[list("l-1", "Weekly")]);

        lists.clear();

        assert!(lists.load_all().is_empty());
    }

    #[test]
    fn failures_are_swallowed() {
        let (store, lists) = memory();
        lists.save_all(&[list("l-1", "Weekly")]);
        store.set_failing(true);

        assert!(lists.load_all().is_empty());
        lists.save_all(&[]);
        lists.insert(list("l-2", "Party"));
        lists.clear();
        assert!(lists.try_save_all(&[]).is_err());

        store.set_failing(false);
        assert_eq!(lists.load_all().len(), 1);
    }

    #[test]
    fn buckets_are_independent() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let lists: Collection<List> = Collection::for_bucket(store.clone(), Bucket::ShoppingLists);
        let templates: Collection<GroupList> = Collection::for_bucket(store, Bucket::GroupLists);

        lists.insert(list("l-1", "Weekly"));
        templates.insert(GroupList::new("l-2".parse().unwrap(), "Party".to_string()));

        assert_eq!(lists.count(), 1);
        assert_eq!(templates.count(), 1);
        lists.clear();
        assert_eq!(templates.count(), 1);
    }

    #[test]
    fn legacy_groups_bucket_is_readable() {
        let store = Arc::new(MemoryStore::new());
        store.put_raw(
            "shopping_list_groups",
            r#"[{"id":"g1","name":"Produce","items":[{"id":"i1","name":"Apples","done":true}],"collapsed":false}]"#,
        );
        let legacy: Collection<Group> = Collection::for_bucket(store, Bucket::LegacyGroups);

        let groups = legacy.load_all();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].items[0].done);
    }
}
