//! Package Center CLI - Terminal front-end for the package catalog
//!
//! Provides:
//! - Importing package database snapshots
//! - Browsing installed, recently updated and new packages, and searching
//! - Planning install / remove / upgrade transactions
//! - Checking for (security) updates, once or periodically

mod commands;
mod helpers;
mod output;
mod system;
mod ui;

use anyhow::{Context, Result};
use center_core::{OperationKind, PopulationFilter};
use center_db::PackageDb;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use commands::{
    cmd_categories, cmd_check_updates, cmd_history, cmd_import, cmd_list, cmd_plan, cmd_sources,
    cmd_stats, Session,
};

#[derive(Parser)]
#[command(name = "pkg-center")]
#[command(about = "Browse, search and plan changes to the system's packages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the database
    #[arg(short, long, default_value = "./pkg-center.db")]
    database: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Number of packages in the recent and new lists
    #[arg(long, default_value = "5")]
    highlights: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Imports a JSON snapshot of the package databases
    Import {
        /// Snapshot file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show database statistics
    Stats,

    /// Lists groups and their components
    Categories,

    /// Lists configured repositories
    Sources,

    /// Lists installed packages
    Installed,

    /// Lists recently updated packages
    Recent,

    /// Lists newly uploaded packages
    New,

    /// Searches names, summaries and descriptions
    Search {
        /// Search terms (spaces, '-' and '_' match each other)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Shows what an operation would install, remove and upgrade
    Plan {
        /// install, remove, upgrade or system-upgrade
        operation: OperationKind,

        /// Package name
        name: String,
    },

    /// Shows the changes between the installed and the available release
    History {
        /// Package name
        name: String,
    },

    /// Checks for updates and reports them as a notification
    CheckUpdates {
        /// Keep running and check again every SECS seconds
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,

        /// Skip the network check and assume a connection
        #[arg(long, conflicts_with = "assume_offline")]
        assume_online: bool,

        /// Skip the network check and assume no connection
        #[arg(long)]
        assume_offline: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level)
    ).init();

    // Open database
    let db = PackageDb::open(&cli.database)
        .with_context(|| format!("Failed to open database at {:?}", cli.database))?;
    let session = Session {
        db: Arc::new(db),
        threads: cli.threads,
        highlights: cli.highlights,
    };

    match cli.command {
        Commands::Import { input } => {
            cmd_import(input, &session)?;
        }
        Commands::Stats => {
            cmd_stats(&session)?;
        }
        Commands::Categories => {
            cmd_categories(&session)?;
        }
        Commands::Sources => {
            cmd_sources(&session)?;
        }
        Commands::Installed => {
            cmd_list(PopulationFilter::Installed, None, &session)?;
        }
        Commands::Recent => {
            cmd_list(PopulationFilter::Recent, None, &session)?;
        }
        Commands::New => {
            cmd_list(PopulationFilter::New, None, &session)?;
        }
        Commands::Search { query } => {
            let query = query.join(" ");
            cmd_list(PopulationFilter::Search, Some(&query), &session)?;
        }
        Commands::Plan { operation, name } => {
            cmd_plan(operation, name, &session)?;
        }
        Commands::History { name } => {
            cmd_history(name, &session)?;
        }
        Commands::CheckUpdates { watch, assume_online, assume_offline } => {
            cmd_check_updates(watch, assume_online, assume_offline, &session)?;
        }
    }

    Ok(())
}
