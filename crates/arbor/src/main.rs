//! Arbor CLI - hierarchy browser.
//!
//! Provides commands for:
//! - `browse`: Render the whole hierarchy as reference sets or a link list
//! - `children`: Render the children of one group
//! - `validity`: Show the cache descriptor of a view

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BrowseArgs, ChildrenArgs, ValidityArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Arbor - hierarchy browser.
#[derive(Parser)]
#[command(name = "arbor", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the whole hierarchy.
    Browse(BrowseArgs),
    /// Render the sub-groups and leaves of one group.
    Children(ChildrenArgs),
    /// Show the cache descriptor of a view.
    Validity(ValidityArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Browse(args) => args.common.verbose,
            Self::Children(args) => args.common.verbose,
            Self::Validity(args) => args.common.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Browse(args) => args.execute(VERSION),
        Commands::Children(args) => args.execute(VERSION),
        Commands::Validity(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
