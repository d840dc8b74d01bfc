//! Tests for the front-end dispatcher: stale populations and planning surfaces

use anyhow::Result;
use center_core::{
    CancelToken, Group, OperationKind, PackageMeta, PackageRecord, PopulateStats, PopulationFilter,
    Provider, RepositorySource, SetKind, Sink, Transaction,
};
use center_engine::{Frontend, FrontendConfig, PlanFailure, PlanRequest, PlanState, UiEvents};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

// ── fixtures ─────────────────────────────────────────────────────────────────

fn record(origin: &str, name: &str) -> PackageRecord {
    PackageRecord::new(origin, None, Some(PackageMeta::new(name))).unwrap()
}

/// Provider whose slow paths wait for the test to open a gate
///
/// `populate` with the query "slow" and every `plan_*` call block until the
/// gate receives a message. Any other query emits one item named after it.
struct GatedProvider {
    gate: Mutex<Receiver<()>>,
}

impl GatedProvider {
    fn new() -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = channel();
        (Arc::new(Self { gate: Mutex::new(rx) }), tx)
    }

    fn wait(&self) {
        let _ = self.gate.lock().unwrap().recv();
    }

    fn plan(&self, kind: SetKind, item: &PackageRecord) -> center_core::Result<Transaction> {
        self.wait();
        let mut tx = Transaction::new();
        tx.add(kind, item.clone())?;
        Ok(tx)
    }
}

impl Provider for GatedProvider {
    fn id(&self) -> &str {
        "gated"
    }

    fn categories(&self) -> &[Group] {
        &[]
    }

    fn sources(&self) -> center_core::Result<Vec<RepositorySource>> {
        Ok(Vec::new())
    }

    fn populate(
        &self,
        sink: &mut dyn Sink,
        filter: PopulationFilter,
        query: Option<&str>,
        _cancel: &CancelToken,
    ) -> center_core::Result<PopulateStats> {
        // Never polls the token, like a backend call that runs to completion
        let name = match query {
            Some("slow") => {
                self.wait();
                "stale"
            }
            Some(q) => q,
            None => "default",
        };
        sink.add_item(name, record("gated", name), filter);
        Ok(PopulateStats { added: 1, ..Default::default() })
    }

    fn plan_install(&self, item: &PackageRecord) -> center_core::Result<Transaction> {
        self.plan(SetKind::Installations, item)
    }

    fn plan_remove(&self, item: &PackageRecord) -> center_core::Result<Transaction> {
        self.plan(SetKind::Removals, item)
    }

    fn plan_upgrade(&self, item: &PackageRecord) -> center_core::Result<Transaction> {
        self.plan(SetKind::Upgrades, item)
    }
}

#[derive(Default)]
struct Recorder {
    busy: Vec<bool>,
    added: Vec<String>,
    finished: Vec<PopulationFilter>,
    ready: usize,
    sets: Vec<(SetKind, Vec<String>)>,
    failures: Vec<String>,
}

impl UiEvents for Recorder {
    fn on_busy_changed(&mut self, _surface: &str, busy: bool) {
        self.busy.push(busy);
    }

    fn on_items_added(&mut self, _filter: PopulationFilter, records: &[PackageRecord]) {
        self.added.extend(records.iter().map(|r| r.id().to_string()));
    }

    fn on_population_finished(&mut self, filter: PopulationFilter, _provider: &str, _stats: &PopulateStats) {
        self.finished.push(filter);
    }

    fn on_transaction_ready(&mut self, _surface: &str, _transaction: &Transaction) {
        self.ready += 1;
    }

    fn on_transaction_set(&mut self, _surface: &str, kind: SetKind, entries: &[&PackageRecord]) {
        self.sets.push((kind, entries.iter().map(|r| r.id().to_string()).collect()));
    }

    fn on_plan_failed(&mut self, _surface: &str, failure: &PlanFailure) {
        self.failures.push(failure.to_string());
    }
}

fn frontend(provider: &Arc<GatedProvider>) -> Result<Frontend<Recorder>> {
    let providers: Vec<Arc<dyn Provider>> = vec![provider.clone() as Arc<dyn Provider>];
    let config = FrontendConfig { worker_threads: Some(2) };
    Frontend::new(providers, Recorder::default(), &config)
}

// ── population ───────────────────────────────────────────────────────────────

#[test]
fn test_superseded_run_leaves_no_items() -> Result<()> {
    let (provider, gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    frontend.populate(PopulationFilter::Search, Some("slow"));
    frontend.populate(PopulationFilter::Search, Some("fresh"));
    gate.send(())?;
    frontend.run_until_idle();

    assert_eq!(frontend.catalog().ids(PopulationFilter::Search), vec!["fresh"]);
    assert_eq!(frontend.ui().added, vec!["fresh"]);
    assert_eq!(frontend.ui().finished, vec![PopulationFilter::Search]);
    assert!(frontend.is_idle());
    Ok(())
}

#[test]
fn test_cancelled_population_never_lands() -> Result<()> {
    let (provider, gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    frontend.populate(PopulationFilter::Search, Some("slow"));
    frontend.cancel_population(PopulationFilter::Search);
    assert!(!frontend.is_populating(PopulationFilter::Search));
    gate.send(())?;
    frontend.run_until_idle();

    assert!(frontend.catalog().is_empty(PopulationFilter::Search));
    assert!(frontend.ui().added.is_empty());
    assert!(frontend.ui().finished.is_empty());
    Ok(())
}

#[test]
fn test_new_cycle_clears_only_its_bucket() -> Result<()> {
    let (provider, _gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    frontend.populate(PopulationFilter::Installed, None);
    frontend.populate(PopulationFilter::Search, Some("first"));
    frontend.run_until_idle();
    frontend.populate(PopulationFilter::Search, Some("second"));
    frontend.run_until_idle();

    assert_eq!(frontend.catalog().ids(PopulationFilter::Search), vec!["second"]);
    assert_eq!(frontend.catalog().ids(PopulationFilter::Installed), vec!["default"]);
    Ok(())
}

// ── planning ─────────────────────────────────────────────────────────────────

#[test]
fn test_second_plan_rejected_while_planning() -> Result<()> {
    let (provider, gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    let first = frontend.request_plan("details", record("gated", "gimp"), OperationKind::Install);
    let second = frontend.request_plan("details", record("gated", "vlc"), OperationKind::Remove);

    assert_eq!(first, PlanRequest::Accepted);
    assert_eq!(second, PlanRequest::Rejected);
    match frontend.plan_state("details") {
        Some(PlanState::Planning { item, operation }) => {
            assert_eq!(item, "gimp");
            assert_eq!(*operation, OperationKind::Install);
        }
        other => panic!("expected Planning, got {:?}", other),
    }
    assert_eq!(frontend.ui().busy, vec![true]);

    gate.send(())?;
    frontend.run_until_idle();

    let tx = frontend.plan_state("details").and_then(PlanState::transaction).unwrap();
    assert_eq!(tx.ids(SetKind::Installations), vec!["gimp"]);
    assert_eq!(frontend.ui().busy, vec![true, false]);

    // Usable again once resolved
    let third = frontend.request_plan("details", record("gated", "vlc"), OperationKind::Remove);
    assert_eq!(third, PlanRequest::Accepted);
    gate.send(())?;
    frontend.run_until_idle();
    Ok(())
}

#[test]
fn test_surfaces_plan_independently() -> Result<()> {
    let (provider, gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    let a = frontend.request_plan("details", record("gated", "gimp"), OperationKind::Install);
    let b = frontend.request_plan("updates", record("gated", "nano"), OperationKind::Upgrade);
    assert_eq!(a, PlanRequest::Accepted);
    assert_eq!(b, PlanRequest::Accepted);

    gate.send(())?;
    gate.send(())?;
    frontend.run_until_idle();

    assert!(frontend.plan_state("details").and_then(PlanState::transaction).is_some());
    assert!(frontend.plan_state("updates").and_then(PlanState::transaction).is_some());
    Ok(())
}

#[test]
fn test_ready_publishes_every_set() -> Result<()> {
    let (provider, gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    gate.send(())?;
    frontend.request_plan("details", record("gated", "vlc"), OperationKind::Remove);
    frontend.run_until_idle();

    let ui = frontend.ui();
    assert_eq!(ui.ready, 1);
    assert_eq!(
        ui.sets,
        vec![
            (SetKind::Installations, vec![]),
            (SetKind::Removals, vec!["vlc".to_string()]),
            (SetKind::Upgrades, vec![]),
        ]
    );
    Ok(())
}

#[test]
fn test_system_upgrade_fails_as_unsupported() -> Result<()> {
    let (provider, _gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    let request = frontend.request_plan("details", record("gated", "vlc"), OperationKind::SystemUpgrade);
    assert_eq!(request, PlanRequest::Accepted);
    frontend.run_until_idle();

    let failure = frontend.plan_state("details").and_then(PlanState::failure).unwrap();
    assert!(matches!(failure, PlanFailure::Unsupported(OperationKind::SystemUpgrade)));
    assert!(failure.is_programmer_error());
    assert_eq!(frontend.ui().busy, vec![true, false]);
    assert_eq!(frontend.ui().ready, 0);
    assert_eq!(frontend.ui().failures.len(), 1);
    Ok(())
}

#[test]
fn test_unknown_origin_fails() -> Result<()> {
    let (provider, _gate) = GatedProvider::new();
    let mut frontend = frontend(&provider)?;

    frontend.request_plan("details", record("flatpak", "vlc"), OperationKind::Install);
    frontend.run_until_idle();

    let failure = frontend.plan_state("details").and_then(PlanState::failure).unwrap();
    assert!(matches!(failure, PlanFailure::ProviderMissing(origin) if origin == "flatpak"));
    Ok(())
}
