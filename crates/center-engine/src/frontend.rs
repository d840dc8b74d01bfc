//! Interactive-context dispatcher
//!
//! `Frontend` is the single owner of everything the UI can see: the catalog
//! and the planning surfaces. Populations and plans run on a worker pool and
//! report back over a channel; only the dispatcher applies their results,
//! re-checking cancellation on arrival.

use anyhow::{Context, Result};
use center_core::{
    CancelToken, OperationKind, PackageRecord, PopulateStats, PopulationFilter, Provider, SetKind,
    Sink, Transaction,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::formatting::format_size;
use crate::pipeline::{ChannelSink, PopulationPipeline};
use crate::planner::{execute_plan, PlanFailure, PlanRequest, PlanState};

/// Callbacks implemented by the presentation layer
///
/// Every method runs on the interactive context, after the corresponding
/// state has been updated. All methods default to doing nothing.
pub trait UiEvents {
    /// A planning surface became busy or usable again
    fn on_busy_changed(&mut self, _surface: &str, _busy: bool) {}

    /// New records landed in a catalog bucket
    fn on_items_added(&mut self, _filter: PopulationFilter, _records: &[PackageRecord]) {}

    /// One provider finished (or abandoned) a population run
    fn on_population_finished(&mut self, _filter: PopulationFilter, _provider: &str, _stats: &PopulateStats) {}

    fn on_transaction_ready(&mut self, _surface: &str, _transaction: &Transaction) {}

    /// One set of a ready transaction; an empty slice means "hide this block"
    fn on_transaction_set(&mut self, _surface: &str, _kind: SetKind, _entries: &[&PackageRecord]) {}

    fn on_plan_failed(&mut self, _surface: &str, _failure: &PlanFailure) {}
}

/// Headless front-end
impl UiEvents for () {}

/// Messages from workers to the dispatcher
pub(crate) enum Event {
    Item {
        provider: String,
        filter: PopulationFilter,
        token: CancelToken,
        id: String,
        record: PackageRecord,
    },
    PopulationDone {
        provider: String,
        filter: PopulationFilter,
        token: CancelToken,
        result: center_core::Result<PopulateStats>,
    },
    PlanDone {
        surface: String,
        result: std::result::Result<Transaction, PlanFailure>,
    },
}

/// Front-end tunables
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    /// Worker threads for populations and plans (default: number of CPU cores)
    pub worker_threads: Option<usize>,
}

pub struct Frontend<U: UiEvents> {
    providers: Vec<Arc<dyn Provider>>,
    catalog: Catalog,
    pipeline: PopulationPipeline,
    surfaces: HashMap<String, PlanState>,
    ui: U,
    pool: rayon::ThreadPool,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    /// Populations and plans whose completion message has not arrived yet
    in_flight: usize,
}

impl<U: UiEvents> Frontend<U> {
    pub fn new(providers: Vec<Arc<dyn Provider>>, ui: U, config: &FrontendConfig) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("center-worker-{}", i));
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().context("Failed to build worker pool")?;
        log::debug!("Worker pool ready with {} threads", pool.current_num_threads());

        let (sender, receiver) = channel();
        Ok(Self {
            providers,
            catalog: Catalog::new(),
            pipeline: PopulationPipeline::default(),
            surfaces: HashMap::new(),
            ui,
            pool,
            sender,
            receiver,
            in_flight: 0,
        })
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn provider(&self, id: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.id() == id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// True when no population or plan is in flight
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    // ── population ──────────────────────────────────────────────────────────

    /// Starts a population cycle for `filter` across all providers
    ///
    /// Any run still active on the same filter is cancelled first and the
    /// bucket is cleared, so nothing from the superseded cycle stays visible.
    pub fn populate(&mut self, filter: PopulationFilter, query: Option<&str>) {
        self.pipeline.cancel_filter(filter);
        self.catalog.begin_cycle(filter);

        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let token = self.pipeline.begin(provider.id(), filter);
            let query = query.map(str::to_string);
            let sender = self.sender.clone();
            self.in_flight += 1;

            self.pool.spawn(move || {
                let provider_id = provider.id().to_string();
                let mut sink = ChannelSink {
                    provider: provider_id.clone(),
                    token: token.clone(),
                    sender: sender.clone(),
                };
                let result = provider.populate(&mut sink, filter, query.as_deref(), &token);
                let done = Event::PopulationDone {
                    provider: provider_id,
                    filter,
                    token,
                    result,
                };
                if sender.send(done).is_err() {
                    log::debug!("Dispatcher gone before {} population finished", filter);
                }
            });
        }
    }

    /// Cancels every active run on `filter`; their items will never land
    pub fn cancel_population(&mut self, filter: PopulationFilter) {
        let cancelled = self.pipeline.cancel_filter(filter);
        if cancelled > 0 {
            log::debug!("Cancelled {} {} population runs", cancelled, filter);
        }
    }

    pub fn is_populating(&self, filter: PopulationFilter) -> bool {
        self.pipeline.is_running(filter)
    }

    // ── planning ────────────────────────────────────────────────────────────

    /// Asks the item's owning provider to plan `operation`
    ///
    /// Rejected without any state change while the surface is still planning.
    pub fn request_plan(&mut self, surface: &str, item: PackageRecord, operation: OperationKind) -> PlanRequest {
        let state = self.surfaces.entry(surface.to_string()).or_default();
        if state.is_planning() {
            log::debug!("Surface {} busy, rejecting {} {}", surface, operation, item.id());
            return PlanRequest::Rejected;
        }

        *state = PlanState::Planning {
            item: item.id().to_string(),
            operation,
        };
        self.ui.on_busy_changed(surface, true);

        let provider = self.provider(item.origin()).cloned();
        let sender = self.sender.clone();
        let surface = surface.to_string();
        self.in_flight += 1;

        self.pool.spawn(move || {
            let result = match provider {
                Some(provider) => execute_plan(provider.as_ref(), &item, operation),
                None => Err(PlanFailure::ProviderMissing(item.origin().to_string())),
            };
            if sender.send(Event::PlanDone { surface, result }).is_err() {
                log::debug!("Dispatcher gone before plan finished");
            }
        });

        PlanRequest::Accepted
    }

    pub fn plan_state(&self, surface: &str) -> Option<&PlanState> {
        self.surfaces.get(surface)
    }

    pub fn is_planning(&self, surface: &str) -> bool {
        self.surfaces.get(surface).is_some_and(PlanState::is_planning)
    }

    // ── dispatch ────────────────────────────────────────────────────────────

    /// Applies every message already waiting, without blocking
    ///
    /// Returns the number of messages processed.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut added = BTreeMap::new();
        let mut processed = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event, &mut added);
            processed += 1;
        }
        self.flush_added(&mut added);
        processed
    }

    /// Blocks, applying messages as they arrive, until nothing is in flight
    pub fn run_until_idle(&mut self) {
        let mut added = BTreeMap::new();
        while self.in_flight > 0 {
            // Hand over what arrived so far before waiting again
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(_) => {
                    self.flush_added(&mut added);
                    match self.receiver.recv() {
                        Ok(event) => event,
                        Err(_) => break,
                    }
                }
            };
            self.apply(event, &mut added);
        }
        self.flush_added(&mut added);
    }

    fn flush_added(&mut self, added: &mut BTreeMap<PopulationFilter, Vec<PackageRecord>>) {
        for (filter, records) in std::mem::take(added) {
            if !records.is_empty() {
                self.ui.on_items_added(filter, &records);
            }
        }
    }

    fn apply(&mut self, event: Event, added: &mut BTreeMap<PopulationFilter, Vec<PackageRecord>>) {
        match event {
            Event::Item {
                provider,
                filter,
                token,
                id,
                record,
            } => {
                if !self.pipeline.is_current(&provider, filter, &token) {
                    log::debug!("Discarding stale {} item {} from {}", filter, id, provider);
                    return;
                }
                self.catalog.add_item(&id, record.clone(), filter);
                added.entry(filter).or_insert_with(Vec::new).push(record);
            }
            Event::PopulationDone {
                provider,
                filter,
                token,
                result,
            } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let current = self.pipeline.is_current(&provider, filter, &token);
                self.pipeline.finish(&provider, filter, &token);

                let stats = match result {
                    Ok(stats) => stats,
                    Err(e) => {
                        log::warn!("{} population of {} failed: {}", filter, provider, e);
                        PopulateStats::default()
                    }
                };
                if current {
                    self.flush_added(added);
                    self.ui.on_population_finished(filter, &provider, &stats);
                }
            }
            Event::PlanDone { surface, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.finish_plan(&surface, result);
            }
        }
    }

    fn finish_plan(&mut self, surface: &str, result: std::result::Result<Transaction, PlanFailure>) {
        let Some(state) = self.surfaces.get_mut(surface) else {
            log::warn!("Plan result for unknown surface {}", surface);
            return;
        };
        if !state.is_planning() {
            log::warn!("Plan result for surface {} which is not planning", surface);
            return;
        }

        *state = match result {
            Ok(tx) => {
                log::info!(
                    "Plan ready on {}: install {} / remove {}",
                    surface,
                    format_size(tx.install_size()),
                    format_size(tx.removal_size())
                );
                PlanState::Ready(tx)
            }
            Err(failure) => {
                if failure.is_programmer_error() {
                    log::error!("Planning on {} failed: {}", surface, failure);
                } else {
                    log::warn!("Planning on {} failed: {}", surface, failure);
                }
                PlanState::Failed(failure)
            }
        };

        self.ui.on_busy_changed(surface, false);
        match &*state {
            PlanState::Ready(tx) => {
                self.ui.on_transaction_ready(surface, tx);
                for kind in SetKind::ALL {
                    let entries: Vec<&PackageRecord> = tx.entries(kind).collect();
                    self.ui.on_transaction_set(surface, kind, &entries);
                }
            }
            PlanState::Failed(failure) => self.ui.on_plan_failed(surface, failure),
            _ => {}
        }
    }
}
