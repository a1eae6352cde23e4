//! modstack CLI

mod cli;

use anstream::eprintln;
use clap::{Parser, Subcommand};
use cli::context::CommandContext;
use cli::merge::{MergeOptions, run_merge};
use cli::order::{run_add, run_list, run_move, run_remove};
use cli::style::Stylize;
use modstack::config::CONFIG_ENV;
use modstack::error::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Merge game mods in load order
///
/// Mods are overlaid in load order: when two mods ship the same file, the
/// one later in the list wins. Archive, changelog and resource-table
/// formats are merged by external tools after the overlay.
#[derive(Parser)]
#[command(name = "modstack")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the load order (lowest precedence first)
    List,

    /// Register a staged mod at the end of the load order
    Add {
        /// Mod id (folder name under the mods directory)
        id: String,
    },

    /// Remove a mod from the load order
    Remove {
        /// Mod id
        id: String,
    },

    /// Move a mod to a new position in the load order
    Move {
        /// Mod id
        id: String,
        /// New 0-based position; past the end means highest precedence
        index: usize,
    },

    /// Rebuild the merged output from the load order
    Merge {
        /// Show the merge plan without touching the output
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = CommandContext::new(cli.config.as_deref())?;

    match cli.command {
        Commands::List => {
            run_list(&ctx);
            Ok(())
        }
        Commands::Add { id } => run_add(&mut ctx, &id),
        Commands::Remove { id } => run_remove(&mut ctx, &id),
        Commands::Move { id, index } => run_move(&mut ctx, &id, index),
        Commands::Merge { dry_run } => run_merge(&ctx, MergeOptions { dry_run }).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "Error:".error());
            ExitCode::FAILURE
        }
    }
}
