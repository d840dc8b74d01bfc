//! Population logic
//!
//! Each filter lives in its own module:
//! - installed packages (installed.rs)
//! - free-text search (search.rs)
//! - recently updated and newly uploaded packages (highlights.rs)

mod highlights;
mod installed;
mod search;

pub use search::search_pattern;

use center_core::{CancelToken, PackageRecord, PopulateStats, PopulationFilter, Sink};

use crate::provider::LocalProvider;

impl LocalProvider {
    /// Looks up `name` and hands the record to the sink
    ///
    /// Backend failures on a single item are logged and counted as skipped so
    /// one bad entry never aborts the whole run.
    pub(crate) fn emit(
        &self,
        sink: &mut dyn Sink,
        name: &str,
        filter: PopulationFilter,
        stats: &mut PopulateStats,
    ) {
        match self.lookup(name) {
            Ok(Some(record)) => {
                let id = record.id().to_string();
                sink.add_item(&id, record, filter);
                stats.added += 1;
            }
            Ok(None) => {
                log::debug!("{} vanished during population", name);
                stats.skipped += 1;
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", name, e);
                stats.skipped += 1;
            }
        }
    }

    /// Emits every name in order, stopping as soon as `cancel` is set
    pub(crate) fn emit_all<'a, I>(
        &self,
        sink: &mut dyn Sink,
        names: I,
        filter: PopulationFilter,
        cancel: &CancelToken,
    ) -> PopulateStats
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = PopulateStats::default();
        for name in names {
            if cancel.is_cancelled() {
                log::debug!("{} population cancelled after {} items", filter, stats.added);
                stats.cancelled = true;
                return stats;
            }
            self.emit(sink, name, filter, &mut stats);
        }
        stats
    }
}

/// Builds a record without touching the database (used by highlight lists,
/// which already hold the available snapshot)
pub(crate) fn record_from(
    provider: &LocalProvider,
    available: center_core::PackageMeta,
) -> center_core::Result<PackageRecord> {
    let installed = provider.db.get_installed(&available.name)?;
    PackageRecord::new(&provider.config.id, installed, Some(available))
}
