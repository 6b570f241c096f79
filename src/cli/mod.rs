//! # Command-Line Interface
//!
//! User-facing commands and output formatting for the `shop` binary.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | List | Top-level lists | `list new`, `list ls`, `list show`, `list rm` |
//! | Group | Sections inside a list | `group add`, `group move`, `group reorder` |
//! | Item | Entries inside a group | `item add`, `item done`, `item move` |
//! | Info | Storage locations | `info` |
//!
//! Every command runs against shopping lists unless `--templates` (`-t`)
//! selects the group-list bucket.
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! An operation that changes nothing (stale ID, blank name, item already at
//! the edge) still exits successfully and reports the reason.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr:
//! ```bash
//! shop --verbose list ls
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod list_cmd;
mod group_cmd;
mod item_cmd;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
