//! Recently updated and newly uploaded packages

use center_core::{CancelToken, PackageMeta, PopulateStats, PopulationFilter, Result, Sink};
use chrono::NaiveDate;

use super::record_from;
use crate::provider::LocalProvider;

/// Date of the newest release, if it has a readable one
fn release_date(meta: &PackageMeta) -> Option<NaiveDate> {
    let date = meta.latest()?.date.as_deref()?;
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            log::debug!("Ignoring {}: unreadable release date {:?}", meta.name, date);
            None
        }
    }
}

/// Newest first, ties broken by name, capped at `limit`
fn pick_newest(candidates: Vec<PackageMeta>, limit: usize) -> Vec<PackageMeta> {
    let mut dated: Vec<(NaiveDate, PackageMeta)> = candidates
        .into_iter()
        .filter_map(|meta| release_date(&meta).map(|d| (d, meta)))
        .collect();
    dated.sort_by(|(da, a), (db, b)| db.cmp(da).then_with(|| a.name.cmp(&b.name)));
    dated.into_iter().take(limit).map(|(_, meta)| meta).collect()
}

impl LocalProvider {
    /// Packages that received an update, most recent first
    pub(crate) fn populate_recent(&self, sink: &mut dyn Sink, cancel: &CancelToken) -> Result<PopulateStats> {
        let updated = self
            .db
            .available_packages()?
            .into_iter()
            .filter(|meta| meta.history.len() > 1)
            .collect();
        let picks = pick_newest(updated, self.config.highlight_limit);
        Ok(self.emit_highlights(sink, picks, PopulationFilter::Recent, cancel))
    }

    /// Packages uploaded for the first time, most recent first
    pub(crate) fn populate_new(&self, sink: &mut dyn Sink, cancel: &CancelToken) -> Result<PopulateStats> {
        let fresh = self
            .db
            .available_packages()?
            .into_iter()
            .filter(|meta| meta.history.len() == 1)
            .collect();
        let picks = pick_newest(fresh, self.config.highlight_limit);
        Ok(self.emit_highlights(sink, picks, PopulationFilter::New, cancel))
    }

    fn emit_highlights(
        &self,
        sink: &mut dyn Sink,
        picks: Vec<PackageMeta>,
        filter: PopulationFilter,
        cancel: &CancelToken,
    ) -> PopulateStats {
        let mut stats = PopulateStats::default();
        for meta in picks {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                return stats;
            }
            let name = meta.name.clone();
            match record_from(self, meta) {
                Ok(record) => {
                    sink.add_item(&name, record, filter);
                    stats.added += 1;
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", name, e);
                    stats.skipped += 1;
                }
            }
        }
        stats
    }
}
