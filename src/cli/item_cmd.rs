//! Item CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Container, Direction, GroupId, ItemId, Mutation};
use crate::sync::Session;

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Append an item to a group
    Add {
        /// Group ID
        group: GroupId,

        /// Item name
        name: String,
    },

    /// Rename an item
    Rename {
        /// Group ID
        group: GroupId,

        /// Item ID
        item: ItemId,

        /// New name
        name: String,
    },

    /// Delete an item
    Rm {
        /// Group ID
        group: GroupId,

        /// Item ID
        item: ItemId,
    },

    /// Check or uncheck an item
    Done {
        /// Group ID
        group: GroupId,

        /// Item ID
        item: ItemId,
    },

    /// Swap an item with its neighbour
    Move {
        /// Group ID
        group: GroupId,

        /// Item ID
        item: ItemId,

        /// Direction (up or down)
        direction: Direction,
    },

    /// Set the full item order of a group
    Reorder {
        /// Group ID
        group: GroupId,

        /// Every item ID of the group, in the new order
        #[arg(required = true)]
        items: Vec<ItemId>,
    },
}

pub fn run<C: Container>(cmd: ItemCommands, session: &mut Session<C>, output: &Output) -> Result<()> {
    let (mutation, id, message) = match cmd {
        ItemCommands::Add { group, name } => {
            let id = ItemId::generate(&name);
            let message = format!("Added item: {} - {}", id, name.trim());
            (Mutation::AddItem { group, id: id.clone(), name }, id.to_string(), message)
        }
        ItemCommands::Rename { group, item, name } => {
            let message = format!("Renamed item: {}", item);
            (Mutation::RenameItem { group, item: item.clone(), name }, item.to_string(), message)
        }
        ItemCommands::Rm { group, item } => {
            let message = format!("Removed item: {}", item);
            (Mutation::RemoveItem { group, item: item.clone() }, item.to_string(), message)
        }
        ItemCommands::Done { group, item } => {
            let message = format!("Toggled item: {}", item);
            (Mutation::ToggleDone { group, item: item.clone() }, item.to_string(), message)
        }
        ItemCommands::Move {
            group,
            item,
            direction,
        } => {
            let message = format!("Moved item {} {}", item, direction);
            let mutation = Mutation::MoveItem {
                group,
                item: item.clone(),
                direction,
            };
            (mutation, item.to_string(), message)
        }
        ItemCommands::Reorder { group, items } => {
            let message = format!("Reordered {} item(s) in {}", items.len(), group);
            let id = group.to_string();
            (Mutation::ReorderItems { group, order: items }, id, message)
        }
    };

    let outcome = session.apply(&mutation);
    output.outcome(mutation.action(), &outcome, Some(&id), &message);
    Ok(())
}
