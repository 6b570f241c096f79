//! List CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{AnyList, Container, Group, ListId, Mutation};
use crate::storage::DataDir;
use crate::sync::Session;

#[derive(Subcommand)]
pub enum ListCommands {
    /// Create a list (named "New List N" when NAME is omitted)
    New {
        /// List name
        name: Option<String>,
    },

    /// Show all lists
    Ls {
        /// Include both shopping lists and group lists
        #[arg(long)]
        all: bool,
    },

    /// Show a list with its groups and items
    Show {
        /// List ID
        list: ListId,
    },

    /// Rename a list
    Rename {
        /// List ID
        list: ListId,

        /// New name
        name: String,
    },

    /// Delete a list with all its groups and items
    Rm {
        /// List ID
        list: ListId,
    },

    /// Delete every list in the bucket
    Clear,
}

pub fn run<C: Container>(cmd: ListCommands, session: &mut Session<C>, output: &Output) -> Result<()> {
    match cmd {
        ListCommands::New { name } => {
            let (id, outcome) = session.add_list(name.as_deref());
            let name = session.list(&id).map(|l| l.name().to_string()).unwrap_or_default();
            output.outcome(
                "add_list",
                &outcome,
                Some(id.as_str()),
                &format!("Created list: {} - {}", id, name),
            );
            Ok(())
        }
        ListCommands::Ls { .. } => {
            let lists: Vec<AnyList> = session.lists().iter().map(Container::to_any).collect();
            print_lists(output, &lists);
            Ok(())
        }
        ListCommands::Show { list } => show(session, output, &list),
        ListCommands::Rename { list, name } => {
            let mutation = Mutation::RenameList {
                list: list.clone(),
                name,
            };
            let outcome = session.apply(&mutation);
            output.outcome(
                mutation.action(),
                &outcome,
                Some(list.as_str()),
                &format!("Renamed list: {}", list),
            );
            Ok(())
        }
        ListCommands::Rm { list } => {
            let mutation = Mutation::RemoveList { list: list.clone() };
            let outcome = session.apply(&mutation);
            output.outcome(
                mutation.action(),
                &outcome,
                Some(list.as_str()),
                &format!("Removed list: {}", list),
            );
            Ok(())
        }
        ListCommands::Clear => {
            let count = session.lists().len();
            session.clear();
            if output.is_json() {
                output.data(&serde_json::json!({ "cleared": count }));
            } else {
                output.success(&format!("Removed {} list(s)", count));
            }
            Ok(())
        }
    }
}

/// Lists both buckets side by side
pub fn list_all(output: &Output, data: &DataDir) -> Result<()> {
    let mut lists: Vec<AnyList> = data.lists().load_all().into_iter().map(AnyList::from).collect();
    lists.extend(data.templates().load_all().into_iter().map(AnyList::from));
    print_lists(output, &lists);
    Ok(())
}

fn print_lists(output: &Output, lists: &[AnyList]) {
    if output.is_json() {
        let items: Vec<_> = lists
            .iter()
            .map(|l| {
                serde_json::json!({
                    "id": l.id(),
                    "name": l.name(),
                    "type": l.kind(),
                    "groups": l.groups().len(),
                    "items": l.groups().iter().map(|g| g.items.len()).sum::<usize>(),
                })
            })
            .collect();
        output.data(&items);
    } else if lists.is_empty() {
        println!("No lists found.");
    } else {
        println!("{:<16} {:<6} {:>6} {:>6}  NAME", "ID", "TYPE", "GROUPS", "ITEMS");
        println!("{}", "-".repeat(60));
        for l in lists {
            let items: usize = l.groups().iter().map(|g| g.items.len()).sum();
            println!(
                "{:<16} {:<6} {:>6} {:>6}  {}",
                l.id(),
                l.kind().as_str(),
                l.groups().len(),
                items,
                l.name()
            );
        }
    }
}

fn show<C: Container>(session: &Session<C>, output: &Output, id: &ListId) -> Result<()> {
    let Some(list) = session.list(id) else {
        anyhow::bail!("List not found: {}", id);
    };

    if output.is_json() {
        output.data(list);
        return Ok(());
    }

    println!("{} ({}) [{}]", list.name(), list.id(), C::KIND.as_str());
    if list.groups().is_empty() {
        println!("  (no groups)");
    }
    for group in list.ordered_groups() {
        print_group(group);
    }

    Ok(())
}

fn print_group(group: &Group) {
    let marker = if group.collapsed { "▸" } else { "▾" };
    println!(
        "{} {} ({})  {}/{} done",
        marker,
        group.name,
        group.id,
        group.done_count(),
        group.items.len()
    );

    if group.collapsed {
        return;
    }
    for item in group.ordered_items() {
        let check = if item.done { "[x]" } else { "[ ]" };
        println!("    {} {} ({})", check, item.name, item.id);
    }
}
