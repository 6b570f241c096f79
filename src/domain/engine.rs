//! Mutation engine
//!
//! One operation per user action, applied to the full collection of
//! top-level lists. Operations never fail: a stale ID, a blank name or an
//! invalid reorder leaves the collection untouched and reports why through
//! [`Outcome::Unchanged`]. All validation happens before the first write, so
//! a rejected operation never leaves a partially updated tree behind.
//!
//! Fresh IDs are generated when a [`Mutation`] is built, not when it is
//! applied, which keeps [`Mutation::apply`] deterministic.

use serde::Serialize;
use tracing::debug;

use super::id::{GroupId, ItemId, ListId};
use super::model::{normalize_name, Container, Group, Item};
use super::ordering::{self, normalize, Direction};

/// Why an operation left the collection unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "id", rename_all = "snake_case")]
pub enum Reason {
    ListNotFound(ListId),
    GroupNotFound(GroupId),
    ItemNotFound(ItemId),
    /// The ID chosen for a new entity is already taken
    DuplicateId(String),
    EmptyName,
    AtBoundary,
    NotAPermutation,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::ListNotFound(id) => write!(f, "list not found: {}", id),
            Reason::GroupNotFound(id) => write!(f, "group not found: {}", id),
            Reason::ItemNotFound(id) => write!(f, "item not found: {}", id),
            Reason::DuplicateId(id) => write!(f, "id already in use: {}", id),
            Reason::EmptyName => f.write_str("name is empty"),
            Reason::AtBoundary => f.write_str("already at the edge"),
            Reason::NotAPermutation => {
                f.write_str("new order must contain every existing id exactly once")
            }
        }
    }
}

/// Result of applying a mutation
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged(Reason),
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Changed)
    }

    fn unchanged(reason: Reason) -> Self {
        debug!(%reason, "mutation skipped");
        Outcome::Unchanged(reason)
    }
}

/// A user action against the list collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddList { id: ListId, name: String },
    RenameList { list: ListId, name: String },
    RemoveList { list: ListId },
    AddGroup { list: ListId, id: GroupId, name: String },
    RenameGroup { group: GroupId, name: String },
    RemoveGroup { group: GroupId },
    ToggleCollapsed { group: GroupId },
    MoveGroup { list: ListId, group: GroupId, direction: Direction },
    ReorderGroups { list: ListId, order: Vec<GroupId> },
    AddItem { group: GroupId, id: ItemId, name: String },
    RenameItem { group: GroupId, item: ItemId, name: String },
    RemoveItem { group: GroupId, item: ItemId },
    ToggleDone { group: GroupId, item: ItemId },
    MoveItem { group: GroupId, item: ItemId, direction: Direction },
    ReorderItems { group: GroupId, order: Vec<ItemId> },
}

impl Mutation {
    /// Builds an `AddList` with a freshly generated ID
    pub fn add_list(name: impl Into<String>) -> Self {
        let name = name.into();
        Mutation::AddList {
            id: ListId::generate(&name),
            name,
        }
    }

    /// Builds an `AddGroup` with a freshly generated ID
    pub fn add_group(list: ListId, name: impl Into<String>) -> Self {
        let name = name.into();
        Mutation::AddGroup {
            list,
            id: GroupId::generate(&name),
            name,
        }
    }

    /// Builds an `AddItem` with a freshly generated ID
    pub fn add_item(group: GroupId, name: impl Into<String>) -> Self {
        let name = name.into();
        Mutation::AddItem {
            group,
            id: ItemId::generate(&name),
            name,
        }
    }

    /// Short action name used in logs and output
    pub fn action(&self) -> &'static str {
        match self {
            Mutation::AddList { .. } => "add_list",
            Mutation::RenameList { .. } => "rename_list",
            Mutation::RemoveList { .. } => "remove_list",
            Mutation::AddGroup { .. } => "add_group",
            Mutation::RenameGroup { .. } => "rename_group",
            Mutation::RemoveGroup { .. } => "remove_group",
            Mutation::ToggleCollapsed { .. } => "toggle_collapsed",
            Mutation::MoveGroup { .. } => "move_group",
            Mutation::ReorderGroups { .. } => "reorder_groups",
            Mutation::AddItem { .. } => "add_item",
            Mutation::RenameItem { .. } => "rename_item",
            Mutation::RemoveItem { .. } => "remove_item",
            Mutation::ToggleDone { .. } => "toggle_done",
            Mutation::MoveItem { .. } => "move_item",
            Mutation::ReorderItems { .. } => "reorder_items",
        }
    }

    /// Applies the mutation in place
    pub fn apply<C: Container>(&self, lists: &mut Vec<C>) -> Outcome {
        match self {
            Mutation::AddList { id, name } => add_list(lists, id, name),
            Mutation::RenameList { list, name } => rename_list(lists, list, name),
            Mutation::RemoveList { list } => remove_list(lists, list).map_or_else(
                || Outcome::unchanged(Reason::ListNotFound(list.clone())),
                |_| Outcome::Changed,
            ),
            Mutation::AddGroup { list, id, name } => add_group(lists, list, id, name),
            Mutation::RenameGroup { group, name } => rename_group(lists, group, name),
            Mutation::RemoveGroup { group } => remove_group(lists, group).map_or_else(
                || Outcome::unchanged(Reason::GroupNotFound(group.clone())),
                |_| Outcome::Changed,
            ),
            Mutation::ToggleCollapsed { group } => toggle_collapsed(lists, group),
            Mutation::MoveGroup {
                list,
                group,
                direction,
            } => move_group(lists, list, group, *direction),
            Mutation::ReorderGroups { list, order } => reorder_groups(lists, list, order),
            Mutation::AddItem { group, id, name } => add_item(lists, group, id, name),
            Mutation::RenameItem { group, item, name } => rename_item(lists, group, item, name),
            Mutation::RemoveItem { group, item } => remove_item(lists, group, item),
            Mutation::ToggleDone { group, item } => toggle_done(lists, group, item),
            Mutation::MoveItem {
                group,
                item,
                direction,
            } => move_item(lists, group, item, *direction),
            Mutation::ReorderItems { group, order } => reorder_items(lists, group, order),
        }
    }

    /// Applies the mutation to a copy, leaving `lists` untouched
    pub fn applied<C: Container>(&self, lists: &[C]) -> (Vec<C>, Outcome) {
        let mut next = lists.to_vec();
        let outcome = self.apply(&mut next);
        (next, outcome)
    }
}

fn find_list_mut<'a, C: Container>(lists: &'a mut [C], id: &ListId) -> Option<&'a mut C> {
    lists.iter_mut().find(|l| l.id() == id)
}

fn find_group_mut<'a, C: Container>(lists: &'a mut [C], id: &GroupId) -> Option<&'a mut Group> {
    lists
        .iter_mut()
        .flat_map(|l| l.groups_mut().iter_mut())
        .find(|g| &g.id == id)
}

fn find_item_mut<'a>(group: &'a mut Group, id: &ItemId) -> Option<&'a mut Item> {
    group.items.iter_mut().find(|i| &i.id == id)
}

fn group_id_taken<C: Container>(lists: &[C], id: &GroupId) -> bool {
    lists.iter().any(|l| l.groups().iter().any(|g| &g.id == id))
}

fn item_id_taken<C: Container>(lists: &[C], id: &ItemId) -> bool {
    lists
        .iter()
        .flat_map(|l| l.groups())
        .any(|g| g.items.iter().any(|i| &i.id == id))
}

pub fn add_list<C: Container>(lists: &mut Vec<C>, id: &ListId, name: &str) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    if lists.iter().any(|l| l.id() == id) {
        return Outcome::unchanged(Reason::DuplicateId(id.to_string()));
    }

    lists.push(C::new(id.clone(), name));
    Outcome::Changed
}

pub fn rename_list<C: Container>(lists: &mut [C], id: &ListId, name: &str) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    let Some(list) = find_list_mut(lists, id) else {
        return Outcome::unchanged(Reason::ListNotFound(id.clone()));
    };

    list.set_name(name);
    Outcome::Changed
}

/// Detaches a list from the collection, dropping every group and item it owns
///
/// Returns the removed list so callers can report what went with it.
pub fn remove_list<C: Container>(lists: &mut Vec<C>, id: &ListId) -> Option<C> {
    let index = lists.iter().position(|l| l.id() == id)?;
    Some(lists.remove(index))
}

pub fn add_group<C: Container>(
    lists: &mut [C],
    list_id: &ListId,
    id: &GroupId,
    name: &str,
) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    if group_id_taken(lists, id) {
        return Outcome::unchanged(Reason::DuplicateId(id.to_string()));
    }
    let Some(list) = find_list_mut(lists, list_id) else {
        return Outcome::unchanged(Reason::ListNotFound(list_id.clone()));
    };

    let groups = list.groups_mut();
    normalize(groups);
    let order = groups.len() as u32;
    groups.push(Group::new(id.clone(), name, order));
    Outcome::Changed
}

pub fn rename_group<C: Container>(lists: &mut [C], id: &GroupId, name: &str) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    let Some(group) = find_group_mut(lists, id) else {
        return Outcome::unchanged(Reason::GroupNotFound(id.clone()));
    };

    group.name = name;
    Outcome::Changed
}

/// Detaches a group from whichever list owns it, dropping all of its items
///
/// The remaining siblings are renumbered. Returns the removed group.
pub fn remove_group<C: Container>(lists: &mut [C], id: &GroupId) -> Option<Group> {
    for list in lists.iter_mut() {
        let groups = list.groups_mut();
        if let Some(index) = groups.iter().position(|g| &g.id == id) {
            let removed = groups.remove(index);
            normalize(groups);
            return Some(removed);
        }
    }
    None
}

pub fn toggle_collapsed<C: Container>(lists: &mut [C], id: &GroupId) -> Outcome {
    let Some(group) = find_group_mut(lists, id) else {
        return Outcome::unchanged(Reason::GroupNotFound(id.clone()));
    };

    group.collapsed = !group.collapsed;
    Outcome::Changed
}

pub fn move_group<C: Container>(
    lists: &mut [C],
    list_id: &ListId,
    id: &GroupId,
    direction: Direction,
) -> Outcome {
    let Some(list) = find_list_mut(lists, list_id) else {
        return Outcome::unchanged(Reason::ListNotFound(list_id.clone()));
    };

    match ordering::step(list.groups_mut(), id, direction) {
        Some(true) => Outcome::Changed,
        Some(false) => Outcome::unchanged(Reason::AtBoundary),
        None => Outcome::unchanged(Reason::GroupNotFound(id.clone())),
    }
}

pub fn reorder_groups<C: Container>(
    lists: &mut [C],
    list_id: &ListId,
    order: &[GroupId],
) -> Outcome {
    let Some(list) = find_list_mut(lists, list_id) else {
        return Outcome::unchanged(Reason::ListNotFound(list_id.clone()));
    };

    if ordering::reorder(list.groups_mut(), order) {
        Outcome::Changed
    } else {
        tracing::warn!(list = %list_id, "rejected group reorder: not a permutation");
        Outcome::unchanged(Reason::NotAPermutation)
    }
}

pub fn add_item<C: Container>(lists: &mut [C], group_id: &GroupId, id: &ItemId, name: &str) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    if item_id_taken(lists, id) {
        return Outcome::unchanged(Reason::DuplicateId(id.to_string()));
    }
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };

    normalize(&mut group.items);
    let order = group.items.len() as u32;
    group.items.push(Item::new(id.clone(), name, order));
    Outcome::Changed
}

pub fn rename_item<C: Container>(
    lists: &mut [C],
    group_id: &GroupId,
    id: &ItemId,
    name: &str,
) -> Outcome {
    let Some(name) = normalize_name(name) else {
        return Outcome::unchanged(Reason::EmptyName);
    };
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };
    let Some(item) = find_item_mut(group, id) else {
        return Outcome::unchanged(Reason::ItemNotFound(id.clone()));
    };

    item.name = name;
    Outcome::Changed
}

pub fn remove_item<C: Container>(lists: &mut [C], group_id: &GroupId, id: &ItemId) -> Outcome {
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };
    let Some(index) = group.items.iter().position(|i| &i.id == id) else {
        return Outcome::unchanged(Reason::ItemNotFound(id.clone()));
    };

    group.items.remove(index);
    normalize(&mut group.items);
    Outcome::Changed
}

pub fn toggle_done<C: Container>(lists: &mut [C], group_id: &GroupId, id: &ItemId) -> Outcome {
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };
    let Some(item) = find_item_mut(group, id) else {
        return Outcome::unchanged(Reason::ItemNotFound(id.clone()));
    };

    item.done = !item.done;
    Outcome::Changed
}

pub fn move_item<C: Container>(
    lists: &mut [C],
    group_id: &GroupId,
    id: &ItemId,
    direction: Direction,
) -> Outcome {
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };

    match ordering::step(&mut group.items, id, direction) {
        Some(true) => Outcome::Changed,
        Some(false) => Outcome::unchanged(Reason::AtBoundary),
        None => Outcome::unchanged(Reason::ItemNotFound(id.clone())),
    }
}

pub fn reorder_items<C: Container>(lists: &mut [C], group_id: &GroupId, order: &[ItemId]) -> Outcome {
    let Some(group) = find_group_mut(lists, group_id) else {
        return Outcome::unchanged(Reason::GroupNotFound(group_id.clone()));
    };

    if ordering::reorder(&mut group.items, order) {
        Outcome::Changed
    } else {
        tracing::warn!(group = %group_id, "rejected item reorder: not a permutation");
        Outcome::unchanged(Reason::NotAPermutation)
    }
}
