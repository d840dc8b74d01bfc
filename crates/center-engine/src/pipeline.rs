//! Population runs: one cancellation token per (provider, filter) scope

use center_core::{CancelToken, PackageRecord, PopulationFilter, Sink};
use std::collections::HashMap;
use std::sync::mpsc::Sender;

use crate::frontend::Event;

/// A population scope: which provider enumerates which filter
pub(crate) type Scope = (String, PopulationFilter);

/// Tracks the active run of every scope
///
/// At most one run per scope is active; beginning a new one cancels the
/// previous run's token.
#[derive(Debug, Default)]
pub(crate) struct PopulationPipeline {
    active: HashMap<Scope, CancelToken>,
}

impl PopulationPipeline {
    /// Registers a fresh run for the scope and cancels the one it supersedes
    pub(crate) fn begin(&mut self, provider: &str, filter: PopulationFilter) -> CancelToken {
        let token = CancelToken::new();
        if let Some(previous) = self.active.insert((provider.to_string(), filter), token.clone()) {
            log::debug!("Superseding running {} population of {}", filter, provider);
            previous.cancel();
        }
        token
    }

    /// Cancels every active run on `filter`, returning how many were running
    pub(crate) fn cancel_filter(&mut self, filter: PopulationFilter) -> usize {
        let mut cancelled = 0;
        self.active.retain(|(_, f), token| {
            if *f == filter {
                token.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }

    /// True if `token` belongs to the scope's active, uncancelled run
    pub(crate) fn is_current(&self, provider: &str, filter: PopulationFilter, token: &CancelToken) -> bool {
        !token.is_cancelled()
            && self
                .active
                .get(&(provider.to_string(), filter))
                .is_some_and(|active| active.same_as(token))
    }

    /// Forgets a finished run, unless a newer run already took its place
    pub(crate) fn finish(&mut self, provider: &str, filter: PopulationFilter, token: &CancelToken) {
        let key = (provider.to_string(), filter);
        if self.active.get(&key).is_some_and(|active| active.same_as(token)) {
            self.active.remove(&key);
        }
    }

    pub(crate) fn is_running(&self, filter: PopulationFilter) -> bool {
        self.active.keys().any(|(_, f)| *f == filter)
    }
}

/// Sink used on worker threads: forwards items to the dispatcher
///
/// Items are dropped here once the run's token is cancelled, so a superseded
/// run stops producing traffic as soon as it observes cancellation.
pub(crate) struct ChannelSink {
    pub(crate) provider: String,
    pub(crate) token: CancelToken,
    pub(crate) sender: Sender<Event>,
}

impl Sink for ChannelSink {
    fn add_item(&mut self, id: &str, record: PackageRecord, filter: PopulationFilter) {
        if self.token.is_cancelled() {
            log::debug!("Dropping {} from cancelled {} run", id, filter);
            return;
        }
        let event = Event::Item {
            provider: self.provider.clone(),
            filter,
            token: self.token.clone(),
            id: id.to_string(),
            record,
        };
        if self.sender.send(event).is_err() {
            log::debug!("Dispatcher gone, dropping {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous_run() {
        let mut pipeline = PopulationPipeline::default();
        let first = pipeline.begin("local", PopulationFilter::Search);
        let second = pipeline.begin("local", PopulationFilter::Search);

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!pipeline.is_current("local", PopulationFilter::Search, &first));
        assert!(pipeline.is_current("local", PopulationFilter::Search, &second));
    }

    #[test]
    fn test_scopes_do_not_interfere() {
        let mut pipeline = PopulationPipeline::default();
        let search = pipeline.begin("local", PopulationFilter::Search);
        let installed = pipeline.begin("local", PopulationFilter::Installed);
        let other = pipeline.begin("flatpak", PopulationFilter::Search);

        assert!(!search.is_cancelled());
        assert!(!installed.is_cancelled());
        assert!(!other.is_cancelled());

        assert_eq!(pipeline.cancel_filter(PopulationFilter::Search), 2);
        assert!(search.is_cancelled() && other.is_cancelled());
        assert!(pipeline.is_running(PopulationFilter::Installed));
    }

    #[test]
    fn test_finish_ignores_superseded_token() {
        let mut pipeline = PopulationPipeline::default();
        let old = pipeline.begin("local", PopulationFilter::New);
        let new = pipeline.begin("local", PopulationFilter::New);

        pipeline.finish("local", PopulationFilter::New, &old);
        assert!(pipeline.is_current("local", PopulationFilter::New, &new));

        pipeline.finish("local", PopulationFilter::New, &new);
        assert!(!pipeline.is_running(PopulationFilter::New));
    }
}
