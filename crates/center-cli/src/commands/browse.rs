//! Categories and sources commands

use anyhow::Result;
use center_core::Provider;
use colored::Colorize;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use super::Session;
use crate::output::SourceRow;

/// Prints the group / component tree
pub fn cmd_categories(session: &Session) -> Result<()> {
    let provider = session.provider()?;
    let groups = provider.categories();

    if groups.is_empty() {
        println!("{} No categories in database", "❌".red());
        return Ok(());
    }

    for group in groups {
        println!("{} {} {}", "📂".bright_cyan(), group.name.bold(), format!("({}, {})", group.id, group.icon_name()).bright_black());
        for component in &group.components {
            println!("    {} {}", component.name, format!("[{}]", component.id).bright_black());
        }
    }
    Ok(())
}

/// Prints every configured repository, active or not
pub fn cmd_sources(session: &Session) -> Result<()> {
    let provider = session.provider()?;
    let sources = provider.sources()?;

    if sources.is_empty() {
        println!("{} No repositories configured", "❌".red());
        return Ok(());
    }

    let rows: Vec<SourceRow> = sources
        .iter()
        .map(|source| SourceRow {
            name: source.name.clone(),
            url: source.url.clone(),
            status: if source.active { "active".to_string() } else { "inactive".to_string() },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
    Ok(())
}
