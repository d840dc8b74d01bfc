//! Installed packages

use center_core::{CancelToken, PopulateStats, PopulationFilter, Result, Sink};

use crate::provider::LocalProvider;

impl LocalProvider {
    /// Emits every installed package, paired with its available snapshot
    pub(crate) fn populate_installed(
        &self,
        sink: &mut dyn Sink,
        cancel: &CancelToken,
    ) -> Result<PopulateStats> {
        let names = self.db.list_installed()?;
        Ok(self.emit_all(
            sink,
            names.iter().map(String::as_str),
            PopulationFilter::Installed,
            cancel,
        ))
    }
}
