//! Identifiers for lists, groups and items
//!
//! ID Format:
//! - List IDs: `l-{12-char-hash}` (e.g., `l-7f2b4c1a09de`)
//! - Group IDs: `g-{12-char-hash}`
//! - Item IDs: `i-{12-char-hash}`
//!
//! Hash is derived from the entity name, the creation timestamp and a
//! process-wide sequence number, so two entities created with the same name
//! in the same nanosecond still get different IDs.
//!
//! Parsing is deliberately lenient: any non-empty string without whitespace
//! is accepted, because previously persisted data uses plain UUIDs.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid ID: must not be empty")]
    Empty,

    #[error("Invalid ID '{0}': must not contain whitespace")]
    Whitespace(String),
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a 12-character hash from a seed and timestamp
fn generate_hash(seed: &str, timestamp: DateTime<Utc>) -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}",
        seed,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        sequence
    );
    let hash = blake3::hash(input.as_bytes());
    hash.to_hex()[..12].to_string()
}

fn validate(s: &str) -> Result<String, IdError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.chars().any(char::is_whitespace) {
        return Err(IdError::Whitespace(s.to_string()));
    }
    Ok(s.to_string())
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh ID for an entity with the given name
            pub fn generate(name: &str) -> Self {
                Self::generate_at(name, Utc::now())
            }

            /// Generates a fresh ID using an explicit creation timestamp
            pub fn generate_at(name: &str, timestamp: DateTime<Utc>) -> Self {
                Self(format!("{}-{}", $prefix, generate_hash(name, timestamp)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true for the sentinel produced by `Default`
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s).map(Self)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

entity_id!(
    /// ID of a top-level list (shopping list or group list)
    ListId,
    "l"
);

entity_id!(
    /// ID of a group inside a list
    GroupId,
    "g"
);

entity_id!(
    /// ID of an item inside a group
    ItemId,
    "i"
);
