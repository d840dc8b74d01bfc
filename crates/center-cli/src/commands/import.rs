//! Import command implementation

use anyhow::{Context, Result};
use center_db::Snapshot;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

use super::Session;
use crate::helpers::format_duration;

/// Loads a snapshot file into the database
pub fn cmd_import(input: PathBuf, session: &Session) -> Result<()> {
    let start = Instant::now();
    let snapshot = Snapshot::load(&input)
        .with_context(|| format!("Failed to load snapshot {:?}", input))?;

    log::info!("Importing snapshot from {:?}", input);
    let stats = session.db.import_snapshot(&snapshot)?;
    session.db.flush()?;

    println!("{} {}", "✓ Imported".green().bold(), stats);
    println!("  {} {}", "Took".bright_black(), format_duration(start.elapsed()));
    Ok(())
}
