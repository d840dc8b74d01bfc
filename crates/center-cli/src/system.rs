//! Host integration: network detection and notification output

use anyhow::Result;
use center_engine::{Connectivity, Notification, Notifier, Urgency};
use colored::Colorize;
use std::path::PathBuf;

/// Network is considered available when the kernel has a default route
pub struct SystemConnectivity {
    route_table: PathBuf,
}

impl Default for SystemConnectivity {
    fn default() -> Self {
        Self {
            route_table: PathBuf::from("/proc/net/route"),
        }
    }
}

impl Connectivity for SystemConnectivity {
    fn network_available(&self) -> bool {
        match std::fs::read_to_string(&self.route_table) {
            Ok(table) => has_default_route(&table),
            Err(e) => {
                log::debug!("Cannot read {:?}: {}", self.route_table, e);
                false
            }
        }
    }
}

/// True if any route in a `/proc/net/route` dump has destination 0.0.0.0
fn has_default_route(table: &str) -> bool {
    table
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|destination| destination == "00000000")
}

/// Prints notifications to the terminal
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let title = match notification.urgency {
            Urgency::High => notification.title.bright_red().bold(),
            Urgency::Low => notification.title.bright_cyan().bold(),
        };
        println!("\n🔔 {}", title);
        println!("   {}", notification.body);
        if let Some(action) = &notification.action {
            println!("   {} {}", "→".bright_black(), action.label.bright_black());
        }
        log::debug!(
            "Notification {} ({}, {} urgency, {}ms)",
            notification.title,
            notification.icon,
            notification.urgency,
            notification.timeout.as_millis()
        );
        Ok(())
    }
}
