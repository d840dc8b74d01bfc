//! Terminal rendering of front-end callbacks

use center_core::{PackageRecord, PopulateStats, PopulationFilter, SetKind, Transaction};
use center_engine::{format_size, PlanFailure, UiEvents};
use colored::Colorize;

/// Prints planning progress and results as they are dispatched
#[derive(Default)]
pub struct TerminalUi {
    /// Records that reached the catalog
    pub received: usize,
    /// Set when the last plan ended in failure
    pub plan_failed: bool,
}

impl UiEvents for TerminalUi {
    fn on_busy_changed(&mut self, surface: &str, busy: bool) {
        if busy {
            eprintln!("{} Computing changes...", "⏳".bright_black());
        } else {
            log::debug!("Surface {} idle", surface);
        }
    }

    fn on_items_added(&mut self, filter: PopulationFilter, records: &[PackageRecord]) {
        self.received += records.len();
        log::debug!("{} {} records arrived", records.len(), filter);
    }

    fn on_population_finished(&mut self, filter: PopulationFilter, provider: &str, stats: &PopulateStats) {
        if stats.skipped > 0 {
            eprintln!(
                "{} {} entries of {} could not be read and were skipped",
                "⚠".yellow(),
                stats.skipped,
                provider
            );
        }
        log::debug!("{} population of {} finished: {}", filter, provider, stats);
    }

    fn on_transaction_ready(&mut self, _surface: &str, transaction: &Transaction) {
        self.plan_failed = false;
        if transaction.is_empty() {
            println!("{} Nothing to do", "✓".green());
        }
    }

    fn on_transaction_set(&mut self, _surface: &str, kind: SetKind, entries: &[&PackageRecord]) {
        if entries.is_empty() {
            return;
        }

        let heading = match kind {
            SetKind::Installations => "The following packages will be installed:".bright_green(),
            SetKind::Removals => "The following packages will be removed:".bright_red(),
            SetKind::Upgrades => "The following packages will be upgraded:".bright_blue(),
        };
        println!("\n{}", heading.bold());
        for record in entries {
            let meta = match kind {
                SetKind::Removals => record.installed().unwrap_or(record.display()),
                _ => record.available().unwrap_or(record.display()),
            };
            let size = match kind {
                SetKind::Removals => record.installed().and_then(|m| m.install_size),
                _ => meta.install_size,
            };
            println!(
                "  {} {} {}",
                record.id().bold(),
                meta.version().unwrap_or("-"),
                size.map(|s| format!("({})", format_size(s))).unwrap_or_default().bright_black()
            );
        }
    }

    fn on_plan_failed(&mut self, _surface: &str, failure: &PlanFailure) {
        self.plan_failed = true;
        eprintln!("{} Unable to compute changes: {}", "❌".red(), failure);
    }
}
