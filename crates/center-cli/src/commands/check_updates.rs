//! Check-updates command implementation

use anyhow::{Context, Result};
use center_engine::{Connectivity, FixedConnectivity, UpdateChecker, UpdateScheduler};
use colored::Colorize;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use super::Session;
use crate::system::{ConsoleNotifier, SystemConnectivity};

/// Connectivity chosen on the command line
enum NetworkCheck {
    Fixed(FixedConnectivity),
    System(SystemConnectivity),
}

impl Connectivity for NetworkCheck {
    fn network_available(&self) -> bool {
        match self {
            NetworkCheck::Fixed(fixed) => fixed.network_available(),
            NetworkCheck::System(system) => system.network_available(),
        }
    }
}

/// Runs one update cycle, or keeps checking with `--watch`
pub fn cmd_check_updates(
    watch: Option<u64>,
    assume_online: bool,
    assume_offline: bool,
    session: &Session,
) -> Result<()> {
    let network = if assume_online {
        NetworkCheck::Fixed(FixedConnectivity(true))
    } else if assume_offline {
        NetworkCheck::Fixed(FixedConnectivity(false))
    } else {
        NetworkCheck::System(SystemConnectivity::default())
    };

    let provider = Arc::new(session.provider()?);
    let checker = UpdateChecker::new(provider, network, ConsoleNotifier);

    let Some(secs) = watch else {
        let outcome = checker.run_cycle();
        println!("{} {}", "Update check:".bright_cyan(), outcome);
        return Ok(());
    };

    let interval = Duration::from_secs(secs.max(1));
    let scheduler = UpdateScheduler::spawn(Arc::new(checker), interval)?;
    println!(
        "{} Press {} to check now, {} to quit",
        "👀".bright_cyan(),
        "Enter".bold(),
        "q".bold()
    );

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim() == "q" {
            break;
        }
        scheduler.trigger();
    }

    scheduler.stop();
    Ok(())
}
