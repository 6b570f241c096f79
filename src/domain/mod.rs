//! Domain models for shoplist
//!
//! Contains the list/group/item tree and the operations on it, without any
//! I/O concerns.

mod id;
mod model;
pub mod ordering;
pub mod engine;

pub use id::{GroupId, IdError, ItemId, ListId};
pub use model::{normalize_name, AnyList, Container, Group, GroupList, Item, List, ListKind};
pub use ordering::{Direction, DirectionError, Ordered};
pub use engine::{Mutation, Outcome, Reason};
