//! Group CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{Container, Direction, GroupId, ListId, Mutation};
use crate::sync::Session;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Add a group to a list (named "Group N" when NAME is omitted)
    Add {
        /// List ID
        list: ListId,

        /// Group name
        name: Option<String>,
    },

    /// Rename a group
    Rename {
        /// Group ID
        group: GroupId,

        /// New name
        name: String,
    },

    /// Delete a group together with its items
    Rm {
        /// Group ID
        group: GroupId,
    },

    /// Swap a group with its neighbour
    Move {
        /// List ID
        list: ListId,

        /// Group ID
        group: GroupId,

        /// Direction (up or down)
        direction: Direction,
    },

    /// Set the full group order of a list
    Reorder {
        /// List ID
        list: ListId,

        /// Every group ID of the list, in the new order
        #[arg(required = true)]
        groups: Vec<GroupId>,
    },

    /// Collapse or expand a group
    Collapse {
        /// Group ID
        group: GroupId,
    },
}

pub fn run<C: Container>(cmd: GroupCommands, session: &mut Session<C>, output: &Output) -> Result<()> {
    match cmd {
        GroupCommands::Add { list, name } => {
            let (id, outcome) = session.add_group(&list, name.as_deref());
            let name = session
                .list(&list)
                .and_then(|l| l.find_group(&id))
                .map(|g| g.name.clone())
                .unwrap_or_default();
            output.outcome(
                "add_group",
                &outcome,
                Some(id.as_str()),
                &format!("Created group: {} - {}", id, name),
            );
        }
        GroupCommands::Rename { group, name } => {
            let message = format!("Renamed group: {}", group);
            apply(session, output, Mutation::RenameGroup { group, name }, &message);
        }
        GroupCommands::Rm { group } => {
            let message = format!("Removed group: {}", group);
            apply(session, output, Mutation::RemoveGroup { group }, &message);
        }
        GroupCommands::Move {
            list,
            group,
            direction,
        } => {
            let message = format!("Moved group {} {}", group, direction);
            apply(
                session,
                output,
                Mutation::MoveGroup {
                    list,
                    group,
                    direction,
                },
                &message,
            );
        }
        GroupCommands::Reorder { list, groups } => {
            let message = format!("Reordered {} group(s) in {}", groups.len(), list);
            apply(session, output, Mutation::ReorderGroups { list, order: groups }, &message);
        }
        GroupCommands::Collapse { group } => {
            let mutation = Mutation::ToggleCollapsed { group: group.clone() };
            let outcome = session.apply(&mutation);
            let collapsed = session
                .lists()
                .iter()
                .find_map(|l| l.find_group(&group))
                .map(|g| g.collapsed)
                .unwrap_or_default();
            let state = if collapsed { "Collapsed" } else { "Expanded" };
            output.outcome(
                mutation.action(),
                &outcome,
                Some(group.as_str()),
                &format!("{} group: {}", state, group),
            );
        }
    }
    Ok(())
}

/// Applies a mutation that targets one group and reports it
fn apply<C: Container>(session: &mut Session<C>, output: &Output, mutation: Mutation, message: &str) {
    let outcome = session.apply(&mutation);
    let id = match &mutation {
        Mutation::RenameGroup { group, .. }
        | Mutation::RemoveGroup { group }
        | Mutation::MoveGroup { group, .. } => Some(group.as_str()),
        Mutation::ReorderGroups { list, .. } => Some(list.as_str()),
        _ => None,
    };
    output.outcome(mutation.action(), &outcome, id, message);
}
