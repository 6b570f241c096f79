//! Shoplist - Local-first shopping lists
//!
//! Lists own groups and groups own items. Every change is expressed as a
//! [`domain::Mutation`] applied to the whole collection, and a
//! [`sync::Session`] writes the collection back to its storage bucket after
//! each change once the initial load has finished.

pub mod domain;
pub mod storage;
pub mod sync;
pub mod cli;

pub use domain::{Group, GroupId, GroupList, Item, ItemId, List, ListId, Mutation, Outcome};
pub use sync::Session;
