//! Plan command implementation

use anyhow::Result;
use center_core::{OperationKind, Provider};
use center_engine::{format_size, Frontend, FrontendConfig, LocalProvider, PlanState};
use colored::Colorize;
use std::sync::Arc;

use super::Session;
use crate::helpers::{known_names, suggest_names};
use crate::ui::TerminalUi;

/// Surface name the CLI plans on
const SURFACE: &str = "cli";

/// Plans `operation` on `name` and prints the three sets
pub fn cmd_plan(operation: OperationKind, name: String, session: &Session) -> Result<()> {
    let provider = Arc::new(session.provider()?);
    let Some(item) = provider.lookup(&name)? else {
        report_unknown(&name, &provider)?;
        std::process::exit(1);
    };

    let config = FrontendConfig { worker_threads: session.threads };
    let providers: Vec<Arc<dyn Provider>> = vec![provider as Arc<dyn Provider>];
    let mut frontend = Frontend::new(providers, TerminalUi::default(), &config)?;

    println!("{} {} {}", "📦".bright_cyan(), operation.to_string().bold(), name.bold());
    frontend.request_plan(SURFACE, item, operation);
    frontend.run_until_idle();
    if frontend.ui().plan_failed {
        std::process::exit(1);
    }

    match frontend.plan_state(SURFACE) {
        Some(PlanState::Ready(tx)) => {
            println!("{}", "━".repeat(60).bright_black());
            println!("  {} {}", "Download size:".bright_yellow(), format_size(tx.download_size()).bold());
            println!("  {} {}", "Install size:".bright_yellow(), format_size(tx.install_size()).bold());
            println!("  {} {}", "Freed by removals:".bright_yellow(), format_size(tx.removal_size()).bold());
            Ok(())
        }
        _ => std::process::exit(1),
    }
}

fn report_unknown(name: &str, provider: &LocalProvider) -> Result<()> {
    eprintln!("{} Package {} not found in database", "❌".red(), name.bold());
    let suggestions = suggest_names(name, &known_names(provider.db())?, 3);
    if !suggestions.is_empty() {
        eprintln!("\n{} Did you mean: {}", "💡".yellow(), suggestions.join(", ").bold());
    }
    Ok(())
}
