//! Installed / recent / new / search listings

use anyhow::Result;
use center_core::{PopulationFilter, Provider};
use center_engine::{Frontend, FrontendConfig};
use colored::Colorize;
use std::sync::Arc;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use super::Session;
use crate::helpers::{known_names, sort_by_release_date, suggest_names};
use crate::output::PackageRow;
use crate::ui::TerminalUi;

/// Runs one population through the front-end and prints the result
pub fn cmd_list(filter: PopulationFilter, query: Option<&str>, session: &Session) -> Result<()> {
    let provider: Arc<dyn Provider> = Arc::new(session.provider()?);
    let config = FrontendConfig { worker_threads: session.threads };
    let mut frontend = Frontend::new(vec![provider], TerminalUi::default(), &config)?;

    frontend.populate(filter, query);
    frontend.run_until_idle();
    log::debug!("{} records received for {}", frontend.ui().received, filter);

    let mut records = frontend.catalog().records(filter);
    if records.is_empty() {
        match query {
            Some(q) => {
                println!("{} No packages match '{}'", "❌".red(), q.bold());
                let suggestions = suggest_names(q, &known_names(&session.db)?, 3);
                if !suggestions.is_empty() {
                    println!("\n{} Did you mean: {}", "💡".yellow(), suggestions.join(", ").bold());
                }
            }
            None => println!("{} No {} packages", "❌".red(), filter),
        }
        return Ok(());
    }

    if matches!(filter, PopulationFilter::Recent | PopulationFilter::New) {
        sort_by_release_date(&mut records);
    }

    let title = match filter {
        PopulationFilter::Installed => "Installed packages".to_string(),
        PopulationFilter::Recent => "Recently updated".to_string(),
        PopulationFilter::New => "New packages".to_string(),
        PopulationFilter::Search => format!("Results for '{}'", query.unwrap_or_default()),
    };
    println!("\n{} {} {}", "📦".bright_cyan(), title.bold().bright_white(), format!("({})", records.len()).bright_black());
    println!("{}", "━".repeat(60).bright_black());

    let rows: Vec<PackageRow> = records.iter().map(|r| PackageRow::from_record(r)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
    Ok(())
}
