//! # Storage Layer
//!
//! Persistence for shoplist: a flat key-value blob store where each bucket
//! holds one JSON array.
//!
//! ## Buckets
//!
//! | Bucket | Contents | File |
//! |--------|----------|------|
//! | `shopping_lists` | `List[]` | `{data_dir}/shopping_lists.json` |
//! | `group_lists` | `GroupList[]` | `{data_dir}/group_lists.json` |
//! | `shopping_list_groups` | legacy `Group[]` | `{data_dir}/shopping_list_groups.json` |
//!
//! ## Concurrency Safety
//!
//! - [`FileStore`] serializes writers per store (mutex) and per bucket (`fs2` lock)
//! - All writes are atomic (temp file + rename)
//! - [`Collection::insert`] is a read-modify-write under the writer lock
//!
//! ## Key Types
//!
//! - [`DataDir`] - Entry point for the on-disk store
//! - [`Collection`] - Typed load/save/insert/clear over one bucket
//! - [`KvStore`] - The get/set/remove contract implemented by stores
//! - [`Config`] - User configuration

mod bucket;
mod collection;
mod config;
mod data_dir;

pub use bucket::{Bucket, FileStore, KvStore, MemoryStore, StoreError};
pub use collection::Collection;
pub use config::{Config, ConfigError, OutputFormat};
pub use data_dir::{DataDir, DataDirError};
