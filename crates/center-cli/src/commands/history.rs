//! History command implementation

use anyhow::Result;
use center_core::UpdateCandidate;
use colored::Colorize;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use super::Session;
use crate::helpers::{format_relative_date, known_names, suggest_names};
use crate::output::HistoryRow;

/// Shows the releases between the installed and the available package
pub fn cmd_history(name: String, session: &Session) -> Result<()> {
    let db = &session.db;
    let installed = db.get_installed(&name)?;

    let Some(available) = db.get_available(&name)? else {
        if installed.is_some() {
            println!("{} {} is no longer offered by any repository", "❌".red(), name.bold());
            return Ok(());
        }
        eprintln!("{} Package {} not found in database", "❌".red(), name.bold());
        let suggestions = suggest_names(&name, &known_names(db)?, 3);
        if !suggestions.is_empty() {
            eprintln!("\n{} Did you mean: {}", "💡".yellow(), suggestions.join(", ").bold());
        }
        std::process::exit(1);
    };

    let update = UpdateCandidate::from_packages(installed.as_ref(), available);

    println!("\n{} {}", "📦 Package:".bright_cyan(), name.bold());
    println!("{}", "━".repeat(60).bright_black());
    let installed_release = update
        .old_release()
        .map_or_else(|| "not installed".to_string(), |r| r.to_string());
    let available_release = update
        .new_package()
        .release()
        .map_or_else(|| "-".to_string(), |r| r.to_string());
    println!("  {}  {}", "Installed release:".bright_yellow(), installed_release);
    println!("  {}  {}", "Available release:".bright_yellow(), available_release);

    if update.old_release().is_none() {
        return Ok(());
    }

    let slice = update.history_slice();
    if slice.is_empty() {
        println!("\n{} Up to date", "✓".green());
        return Ok(());
    }

    let security = if update.is_security_update() {
        "yes".bright_red().bold()
    } else {
        "no".green()
    };
    println!("  {}  {}", "Security update:".bright_yellow(), security);
    println!();

    let rows: Vec<HistoryRow> = slice
        .iter()
        .map(|entry| HistoryRow {
            release: entry.release,
            version: entry.version.clone(),
            update_type: entry.update_type.clone(),
            date: entry
                .date
                .as_deref()
                .map_or_else(|| "-".to_string(), format_relative_date),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
    Ok(())
}
