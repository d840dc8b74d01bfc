//! Stats command implementation

use anyhow::Result;
use center_engine::{format_number, format_size};
use colored::Colorize;

use super::Session;

/// Displays database statistics
pub fn cmd_stats(session: &Session) -> Result<()> {
    let db = &session.db;
    println!("{}", "Database Statistics:".bright_cyan().bold());
    println!("  {}: {}", "Installed packages".bright_yellow(), format_number(db.installed_count()).bold());
    println!("  {}: {}", "Available packages".bright_yellow(), format_number(db.available_count()).bold());
    println!("  {}: {}", "Groups".bright_yellow(), format_number(db.group_count()).bold());
    println!("  {}: {}", "Repositories".bright_yellow(), format_number(db.repository_count()).bold());
    println!("  {}: {}", "Size on disk".bright_yellow(), format_size(db.db_size_bytes()).bold());

    if db.is_empty() {
        println!("\n{} Nothing imported yet, run {} first", "💡".yellow(), "pkg-center import".bright_cyan());
    }
    Ok(())
}
