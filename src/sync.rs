//! Synchronization between the in-memory list tree and its bucket
//!
//! A [`Session`] owns the whole collection of one bucket. It moves through
//! `Uninitialized -> Loading -> Ready`; once ready, every mutation that
//! changes the tree is followed by a full `save_all` of the collection.
//! Changes made before the load completes are never saved, so an empty
//! initial tree cannot overwrite persisted data.
//!
//! Saves are synchronous and the store serializes writers, so the persisted
//! value always matches the snapshot of the last save issued.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::{Container, GroupId, ListId, Mutation, Outcome};
use crate::storage::{Collection, Config, StoreError};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Uninitialized,
    Loading,
    Ready,
}

/// Default names for lists and groups created without one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub list_prefix: String,
    pub group_prefix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Naming::from(&Config::default())
    }
}

impl From<&Config> for Naming {
    fn from(config: &Config) -> Self {
        Self {
            list_prefix: config.list_name_prefix.clone(),
            group_prefix: config.group_name_prefix.clone(),
        }
    }
}

impl Naming {
    /// Default name for the n-th list
    pub fn list_name(&self, n: usize) -> String {
        format!("{} {}", self.list_prefix, n)
    }

    /// Default name for the n-th group of a list
    pub fn group_name(&self, n: usize) -> String {
        format!("{} {}", self.group_prefix, n)
    }
}

/// State container for one bucket's collection
pub struct Session<C: Container> {
    collection: Collection<C>,
    lists: Vec<C>,
    state: SyncState,
    naming: Naming,
    saves: usize,
    last_error: Option<String>,
}

impl<C: Container> Session<C> {
    pub fn new(collection: Collection<C>) -> Self {
        Self {
            collection,
            lists: Vec::new(),
            state: SyncState::Uninitialized,
            naming: Naming::default(),
            saves: 0,
            last_error: None,
        }
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SyncState::Ready
    }

    pub fn lists(&self) -> &[C] {
        &self.lists
    }

    pub fn list(&self, id: &ListId) -> Option<&C> {
        self.lists.iter().find(|l| l.id() == id)
    }

    /// Number of saves issued since the session was created
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// The most recent storage failure, if any
    ///
    /// Failures never abort a session; this lets a front end show them.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Marks the start of the initial load
    pub fn begin_load(&mut self) {
        debug!(bucket = self.collection.key(), "loading");
        self.state = SyncState::Loading;
    }

    /// Installs the loaded collection and starts persisting changes
    pub fn finish_load(&mut self, lists: Vec<C>) {
        debug!(bucket = self.collection.key(), count = lists.len(), "ready");
        self.lists = lists;
        self.state = SyncState::Ready;
    }

    /// Loads the collection from storage
    ///
    /// Malformed data is treated as an absent bucket. Any other failure is
    /// recorded and also yields an empty collection; the session still
    /// becomes ready.
    pub fn mount(&mut self) {
        self.begin_load();
        let lists = match self.collection.try_load_all() {
            Ok(lists) => lists,
            Err(e @ StoreError::Malformed { .. }) => {
                warn!(bucket = self.collection.key(), error = %e, "ignoring malformed bucket");
                Vec::new()
            }
            Err(e) => {
                error!(bucket = self.collection.key(), error = %e, "load failed, starting empty");
                self.last_error = Some(e.to_string());
                Vec::new()
            }
        };
        self.finish_load(lists);
    }

    /// Returns the list with `id`, creating an unsaved one if it is missing
    ///
    /// The new list is persisted together with the first change made to the
    /// collection.
    pub fn open_list(&mut self, id: &ListId) -> &C {
        let index = match self.lists.iter().position(|l| l.id() == id) {
            Some(index) => index,
            None => {
                let name = self.default_list_name();
                info!(list = %id, %name, "list not found, starting a new one");
                self.lists.push(C::new(id.clone(), name));
                self.lists.len() - 1
            }
        };
        &self.lists[index]
    }

    fn default_list_name(&self) -> String {
        self.naming.list_name(self.lists.len() + 1)
    }

    /// Applies a mutation and persists the collection if it changed
    pub fn apply(&mut self, mutation: &Mutation) -> Outcome {
        let outcome = mutation.apply(&mut self.lists);
        if outcome.is_changed() {
            debug!(action = mutation.action(), "applied");
            self.persist();
        }
        outcome
    }

    /// Adds a list, naming it "{prefix} {n}" when `name` is absent or blank
    pub fn add_list(&mut self, name: Option<&str>) -> (ListId, Outcome) {
        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => self.default_list_name(),
        };

        let id = ListId::generate(&name);
        let outcome = self.apply(&Mutation::AddList {
            id: id.clone(),
            name,
        });
        (id, outcome)
    }

    /// Adds a group, naming it "{prefix} {n}" when `name` is absent or blank
    pub fn add_group(&mut self, list: &ListId, name: Option<&str>) -> (GroupId, Outcome) {
        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let existing = self.list(list).map_or(0, |l| l.groups().len());
                self.naming.group_name(existing + 1)
            }
        };

        let id = GroupId::generate(&name);
        let outcome = self.apply(&Mutation::AddGroup {
            list: list.clone(),
            id: id.clone(),
            name,
        });
        (id, outcome)
    }

    /// Deletes the bucket and empties the in-memory collection
    pub fn clear(&mut self) {
        self.lists.clear();
        if let Err(e) = self.collection.try_clear() {
            error!(bucket = self.collection.key(), error = %e, "clear failed");
            self.last_error = Some(e.to_string());
        }
    }

    fn persist(&mut self) {
        if self.state != SyncState::Ready {
            debug!(state = ?self.state, "not ready, skipping save");
            return;
        }

        self.saves += 1;
        match self.collection.try_save_all(&self.lists) {
            Ok(()) => self.last_error = None,
            Err(e) => {
                error!(bucket = self.collection.key(), error = %e, "save failed");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn into_lists(self) -> Vec<C> {
        self.lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, GroupList, List, Reason};
    use crate::storage::{Bucket, KvStore, MemoryStore};
    use std::sync::Arc;

    fn session() -> (Arc<MemoryStore>, Session<List>) {
        let store = Arc::new(MemoryStore::new());
        let collection = Collection::for_bucket(store.clone(), Bucket::ShoppingLists);
        (store, Session::new(collection))
    }

    fn persisted(store: &MemoryStore) -> Vec<List> {
        store
            .get("shopping_lists")
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    #[test]
    fn starts_uninitialized_and_mount_makes_ready() {
        let (_, mut session) = session();
        assert_eq!(session.state(), SyncState::Uninitialized);

        session.mount();

        assert!(session.is_ready());
        assert!(session.lists().is_empty());
    }

    #[test]
    fn no_save_while_loading() {
        let (store, mut session) = session();
        session.begin_load();

        let (_, outcome) = session.add_list(Some("Weekly"));

        assert!(outcome.is_changed());
        assert_eq!(session.saves(), 0);
        assert_eq!(store.get("shopping_lists").unwrap(), None);
    }

    #[test]
    fn load_replaces_tree_mutated_during_loading() {
        let (store, mut session) = session();
        let existing = vec![List::new("l-1".parse().unwrap(), "Saved".to_string())];
        store.put_raw("shopping_lists", &serde_json::to_string(&existing).unwrap());

        session.begin_load();
        let _ = session.add_list(Some("Scratch"));
        session.mount();

        assert_eq!(session.lists(), existing.as_slice());
        assert_eq!(persisted(&store), existing);
    }

    #[test]
    fn every_change_is_saved_once_ready() {
        let (store, mut session) = session();
        session.mount();

        let (list, _) = session.add_list(Some("Weekly"));
        let (group, _) = session.add_group(&list, Some("Produce"));
        let _ = session.apply(&Mutation::add_item(group.clone(), "Apples"));
        let _ = session.apply(&Mutation::add_item(group, "Pears"));

        assert_eq!(session.saves(), 4);
        assert_eq!(persisted(&store), session.lists());
    }

    #[test]
    fn noops_do_not_save() {
        let (_, mut session) = session();
        session.mount();
        let (list, _) = session.add_list(Some("Weekly"));
        let (group, _) = session.add_group(&list, None);
        let saves = session.saves();

        let outcome = session.apply(&Mutation::MoveGroup {
            list,
            group,
            direction: Direction::Up,
        });

        assert_eq!(outcome, Outcome::Unchanged(Reason::AtBoundary));
        assert_eq!(session.saves(), saves);
    }

    #[test]
    fn default_names_are_numbered() {
        let (_, mut session) = session();
        session.mount();

        let (first, _) = session.add_list(None);
        let (second, _) = session.add_list(Some("   "));
        let _ = session.add_group(&first, None);
        let _ = session.add_group(&first, None);

        assert_eq!(session.list(&first).unwrap().name, "New List 1");
        assert_eq!(session.list(&second).unwrap().name, "New List 2");
        let groups: Vec<_> = session.list(&first).unwrap().groups.iter().map(|g| g.name.clone()).collect();
        assert_eq!(groups, vec!["Group 1", "Group 2"]);
    }

    #[test]
    fn custom_naming() {
        let (_, session) = session();
        let mut session = session.with_naming(Naming {
            list_prefix: "Lista".to_string(),
            group_prefix: "Aisle".to_string(),
        });
        session.mount();

        let (list, _) = session.add_list(None);
        let _ = session.add_group(&list, None);

        assert_eq!(session.list(&list).unwrap().name, "Lista 1");
        assert_eq!(session.list(&list).unwrap().groups[0].name, "Aisle 1");
    }

    #[test]
    fn saving_keeps_items_of_flat_lists() {
        let (store, mut session) = session();
        store.put_raw(
            "shopping_lists",
            r#"[
                {"id":"L1","name":"Flat","items":[{"id":"i1","name":"Milk","done":false}]},
                {"id":"L2","name":"Weekly","groups":[]}
            ]"#,
        );
        session.mount();

        let outcome = session.apply(&Mutation::RenameList {
            list: "L2".parse().unwrap(),
            name: "Saturday".to_string(),
        });

        assert!(outcome.is_changed());
        let saved = persisted(&store);
        assert_eq!(saved[0].items.len(), 1);
        assert_eq!(saved[0].items[0].name, "Milk");
        assert_eq!(saved[1].name, "Saturday");
    }

    #[test]
    fn failed_load_starts_empty_and_records_error() {
        let (store, mut session) = session();
        store.set_failing(true);

        session.mount();

        assert!(session.is_ready());
        assert!(session.lists().is_empty());
        assert!(session.last_error().is_some());
    }

    #[test]
    fn malformed_bucket_starts_empty() {
        let (store, mut session) = session();
        store.put_raw("shopping_lists", "][");

        session.mount();

        assert!(session.is_ready());
        assert!(session.lists().is_empty());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn failed_save_is_recorded_not_fatal() {
        let (store, mut session) = session();
        session.mount();
        store.set_failing(true);

        let (_, outcome) = session.add_list(Some("Weekly"));

        assert!(outcome.is_changed());
        assert_eq!(session.lists().len(), 1);
        assert!(session.last_error().is_some());

        store.set_failing(false);
        let _ = session.add_list(Some("Party"));
        assert!(session.last_error().is_none());
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn open_list_creates_unsaved_list_until_first_change() {
        let (store, mut session) = session();
        session.mount();
        let id: ListId = "l-42".parse().unwrap();

        assert_eq!(session.open_list(&id).name(), "New List 1");
        assert_eq!(store.get("shopping_lists").unwrap(), None);

        let _ = session.add_group(&id, Some("Produce"));
        let saved = persisted(&store);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);
        assert_eq!(saved[0].groups.len(), 1);
    }

    #[test]
    fn open_list_returns_existing() {
        let (_, mut session) = session();
        session.mount();
        let (id, _) = session.add_list(Some("Weekly"));

        assert_eq!(session.open_list(&id).name(), "Weekly");
        assert_eq!(session.lists().len(), 1);
    }

    #[test]
    fn clear_empties_bucket() {
        let (store, mut session) = session();
        session.mount();
        let _ = session.add_list(Some("Weekly"));

        session.clear();

        assert!(session.lists().is_empty());
        assert_eq!(store.get("shopping_lists").unwrap(), None);
    }

    #[test]
    fn group_list_sessions_use_their_bucket() {
        let store = Arc::new(MemoryStore::new());
        let mut session: Session<GroupList> =
            Session::new(Collection::for_bucket(store.clone(), Bucket::GroupLists));
        session.mount();

        let (list, _) = session.add_list(Some("Party"));
        let _ = session.add_group(&list, Some("Drinks"));

        assert!(store.get("group_lists").unwrap().is_some());
        assert_eq!(store.get("shopping_lists").unwrap(), None);
        assert_eq!(session.into_lists()[0].groups[0].name, "Drinks");
    }
}
