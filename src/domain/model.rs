//! Shopping list entities
//!
//! The tree is `List -> Group -> Item`. Ownership is expressed purely by
//! containment: no entity stores the ID of its parent, and removing an entity
//! from its parent's vector destroys it together with everything it owns.
//!
//! Field names are part of the persisted format and must not change:
//! `id`, `name`, `done`, `order`, `items`, `collapsed`, `groups`, `type`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::id::{GroupId, ItemId, ListId};
use super::ordering::Ordered;

/// Trims a user-supplied name, returning `None` when nothing is left
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A single checkable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub done: bool,
    /// Display position among the item's siblings
    #[serde(default)]
    pub order: u32,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            done: false,
            order,
        }
    }
}

impl Ordered for Item {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// A named, collapsible section of a list that exclusively owns its items
///
/// Group lists reuse this shape for their named sub-lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub order: u32,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            items: Vec::new(),
            collapsed: false,
            order,
        }
    }

    /// Items sorted for display (by `order`, ties keep stored position)
    pub fn ordered_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_by_key(|i| i.order);
        items
    }

    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Number of items marked done
    pub fn done_count(&self) -> usize {
        self.items.iter().filter(|i| i.done).count()
    }
}

impl Ordered for Group {
    type Id = GroupId;

    fn id(&self) -> &GroupId {
        &self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Discriminator persisted as the `type` field of top-level lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// A single shopping list made of groups
    #[default]
    List,
    /// A template of named sub-lists
    Group,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::List => "list",
            ListKind::Group => "group",
        }
    }
}

/// Behaviour shared by every top-level aggregate that owns groups
///
/// The mutation engine is written against this trait so the same operations
/// apply to shopping lists and group lists alike.
pub trait Container: Clone + PartialEq + Serialize + DeserializeOwned {
    /// Kind persisted in the `type` field
    const KIND: ListKind;

    fn new(id: ListId, name: String) -> Self;

    /// The "not found" sentinel: empty ID, empty name, no groups
    fn empty() -> Self;

    fn id(&self) -> &ListId;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn groups(&self) -> &[Group];
    fn groups_mut(&mut self) -> &mut Vec<Group>;

    /// Copies the list into the tagged union used at rendering boundaries
    fn to_any(&self) -> AnyList;

    /// Returns true for the sentinel returned by lookups that found nothing
    fn is_empty_sentinel(&self) -> bool {
        self.id().is_empty()
    }

    fn find_group(&self, id: &GroupId) -> Option<&Group> {
        self.groups().iter().find(|g| &g.id == id)
    }

    /// Groups sorted for display
    fn ordered_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups().iter().collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    /// Total number of items across all groups
    fn item_count(&self) -> usize {
        self.groups().iter().map(|g| g.items.len()).sum()
    }
}

/// A shopping list: the aggregate root stored in the `shopping_lists` bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Items stored directly on the list by older versions; kept so a save
    /// never drops them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    #[serde(rename = "type", default)]
    pub kind: ListKind,
}

impl Container for List {
    const KIND: ListKind = ListKind::List;

    fn new(id: ListId, name: String) -> Self {
        Self {
            id,
            name,
            groups: Vec::new(),
            items: Vec::new(),
            kind: ListKind::List,
        }
    }

    fn empty() -> Self {
        Self::new(ListId::default(), String::new())
    }

    fn id(&self) -> &ListId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    fn to_any(&self) -> AnyList {
        AnyList::List(self.clone())
    }
}

fn group_kind() -> ListKind {
    ListKind::Group
}

/// A template of named sub-lists, stored in the `group_lists` bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(rename = "type", default = "group_kind")]
    pub kind: ListKind,
}

impl Container for GroupList {
    const KIND: ListKind = ListKind::Group;

    fn new(id: ListId, name: String) -> Self {
        Self {
            id,
            name,
            groups: Vec::new(),
            kind: ListKind::Group,
        }
    }

    fn empty() -> Self {
        Self::new(ListId::default(), String::new())
    }

    fn id(&self) -> &ListId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn groups(&self) -> &[Group] {
        &self.groups
    }

    fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    fn to_any(&self) -> AnyList {
        AnyList::Group(self.clone())
    }
}

/// Any top-level list, tagged by its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyList {
    List(List),
    Group(GroupList),
}

impl AnyList {
    pub fn kind(&self) -> ListKind {
        match self {
            AnyList::List(_) => ListKind::List,
            AnyList::Group(_) => ListKind::Group,
        }
    }

    pub fn id(&self) -> &ListId {
        match self {
            AnyList::List(l) => &l.id,
            AnyList::Group(l) => &l.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnyList::List(l) => &l.name,
            AnyList::Group(l) => &l.name,
        }
    }

    pub fn groups(&self) -> &[Group] {
        match self {
            AnyList::List(l) => &l.groups,
            AnyList::Group(l) => &l.groups,
        }
    }
}

impl From<List> for AnyList {
    fn from(list: List) -> Self {
        AnyList::List(list)
    }
}

impl From<GroupList> for AnyList {
    fn from(list: GroupList) -> Self {
        AnyList::Group(list)
    }
}
