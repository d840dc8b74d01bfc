//! Command implementations

mod browse;
mod check_updates;
mod history;
mod import;
mod list;
mod plan;
mod stats;

pub use browse::{cmd_categories, cmd_sources};
pub use check_updates::cmd_check_updates;
pub use history::cmd_history;
pub use import::cmd_import;
pub use list::cmd_list;
pub use plan::cmd_plan;
pub use stats::cmd_stats;

use anyhow::Result;
use center_db::PackageDb;
use center_engine::{LocalProvider, ProviderConfig};
use std::sync::Arc;

/// Settings shared by every command
pub struct Session {
    pub db: Arc<PackageDb>,
    pub threads: Option<usize>,
    pub highlights: usize,
}

impl Session {
    pub fn provider(&self) -> Result<LocalProvider> {
        let config = ProviderConfig {
            highlight_limit: self.highlights,
            ..Default::default()
        };
        LocalProvider::new(Arc::clone(&self.db), config)
    }
}
