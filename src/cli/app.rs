//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{group_cmd, item_cmd, list_cmd};
use crate::domain::{Container, GroupList, List};
use crate::storage::{Bucket, Config, DataDir};
use crate::sync::{Naming, Session};

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Local-first shopping lists")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the list buckets
    #[arg(long, global = true, env = "SHOPLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Operate on group lists (templates) instead of shopping lists
    #[arg(long, short = 't', global = true)]
    pub templates: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage lists
    #[command(subcommand)]
    List(list_cmd::ListCommands),

    /// Manage groups inside a list
    #[command(subcommand)]
    Group(group_cmd::GroupCommands),

    /// Manage items inside a group
    #[command(subcommand)]
    Item(item_cmd::ItemCommands),

    /// Show where data and configuration live
    Info,
}

/// Sets up `tracing` on stderr; `RUST_LOG` overrides the configured level
fn init_logging(config: &Config, verbose: bool, format: OutputFormat) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second initialisation (e.g. in tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(format == OutputFormat::Text)
                .with_target(false),
        )
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let format = cli.format.unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format);

    init_logging(&config, cli.verbose, format);
    debug!("shop starting");

    let root = config.resolve_data_dir(cli.data_dir.as_deref())?;
    let data = DataDir::open(&root)?;
    debug!(data_dir = %data.root().display(), templates = cli.templates, "opened data directory");

    match cli.command {
        Commands::Info => info(&output, &data),
        Commands::List(list_cmd::ListCommands::Ls { all: true }) => {
            list_cmd::list_all(&output, &data)
        }
        command if cli.templates => {
            let session = Session::<GroupList>::new(data.templates()).with_naming(Naming::from(&config));
            dispatch(command, session, &output)
        }
        command => {
            let session = Session::<List>::new(data.lists()).with_naming(Naming::from(&config));
            dispatch(command, session, &output)
        }
    }?;

    debug!("command completed");
    Ok(())
}

fn dispatch<C: Container>(command: Commands, mut session: Session<C>, output: &Output) -> Result<()> {
    session.mount();

    match command {
        Commands::List(cmd) => list_cmd::run(cmd, &mut session, output)?,
        Commands::Group(cmd) => group_cmd::run(cmd, &mut session, output)?,
        Commands::Item(cmd) => item_cmd::run(cmd, &mut session, output)?,
        // Answered in `run` without a session
        Commands::Info => {}
    }

    // Storage failures never abort the session, but a CLI run that could not
    // read or write its bucket must not look successful
    if let Some(error) = session.last_error() {
        anyhow::bail!("storage failure: {}", error);
    }
    Ok(())
}

fn info(output: &Output, data: &DataDir) -> Result<()> {
    let config_file = Config::config_dir().map(|dir| dir.join("config.toml"));
    let lists = data.lists().count();
    let templates = data.templates().count();
    let legacy = data.legacy_groups().count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "data_dir": data.root().display().to_string(),
            "config_file": config_file.as_ref().map(|p| p.display().to_string()),
            "buckets": {
                (Bucket::ShoppingLists.key()): lists,
                (Bucket::GroupLists.key()): templates,
                (Bucket::LegacyGroups.key()): legacy,
            },
        }));
    } else {
        println!("Data directory: {}", data.root().display());
        match &config_file {
            Some(path) => println!("Config file:    {}", path.display()),
            None => println!("Config file:    (unavailable)"),
        }
        println!();
        println!("{:<24} ENTRIES", "BUCKET");
        println!("{:<24} {}", Bucket::ShoppingLists.key(), lists);
        println!("{:<24} {}", Bucket::GroupLists.key(), templates);
        println!("{:<24} {}", Bucket::LegacyGroups.key(), legacy);
    }

    Ok(())
}
