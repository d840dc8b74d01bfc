//! Tests for the local provider: populations and planning

use anyhow::Result;
use center_core::{
    CancelToken, CoreError, Dependency, HistoryEntry, ItemStatus, PackageMeta, PackageRecord,
    PopulationFilter, Provider, RepositorySource, SetKind, Sink,
};
use center_db::{ComponentEntry, GroupEntry, PackageDb};
use center_engine::{Catalog, LocalProvider, ProviderConfig};
use std::sync::Arc;
use tempfile::TempDir;

// ── fixtures ─────────────────────────────────────────────────────────────────

fn pkg(name: &str, release: u32) -> PackageMeta {
    let mut m = PackageMeta::new(name);
    m.summary = format!("{} summary", name);
    m.history.push(HistoryEntry::new(release, format!("1.{}", release), "bug"));
    m.install_size = Some(1000 * release as u64);
    m
}

fn dated(name: &str, dates: &[&str]) -> PackageMeta {
    let mut m = PackageMeta::new(name);
    for (i, date) in dates.iter().enumerate() {
        let release = (dates.len() - i) as u32;
        m.history.push(HistoryEntry::new(release, "1.0", "bug").with_date(*date));
    }
    m
}

fn open() -> Result<(TempDir, Arc<PackageDb>)> {
    let tmp = TempDir::new()?;
    let db = PackageDb::open(tmp.path())?;
    Ok((tmp, Arc::new(db)))
}

fn provider(db: &Arc<PackageDb>) -> Result<LocalProvider> {
    LocalProvider::new(Arc::clone(db), ProviderConfig::default())
}

fn populate(provider: &LocalProvider, filter: PopulationFilter, query: Option<&str>) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    provider.populate(&mut catalog, filter, query, &CancelToken::new())?;
    Ok(catalog)
}

/// Sink that cancels its run after a number of items
struct CancellingSink {
    token: CancelToken,
    after: usize,
    received: Vec<String>,
}

impl Sink for CancellingSink {
    fn add_item(&mut self, id: &str, _record: PackageRecord, _filter: PopulationFilter) {
        self.received.push(id.to_string());
        if self.received.len() == self.after {
            self.token.cancel();
        }
    }
}

// ── categories / sources ─────────────────────────────────────────────────────

#[test]
fn test_categories_sorted_and_resolved() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_group(&GroupEntry {
        id: "multimedia".into(),
        name: "Sound & Video".into(),
        icon: "applications-multimedia".into(),
        components: vec!["multimedia.video".into(), "multimedia.audio".into(), "ghost".into()],
    })?;
    db.insert_group(&GroupEntry {
        id: "desktop".into(),
        name: "Desktop".into(),
        icon: "user-desktop".into(),
        components: vec![],
    })?;
    db.insert_component(&ComponentEntry { id: "multimedia.audio".into(), name: "Audio".into() })?;
    db.insert_component(&ComponentEntry { id: "multimedia.video".into(), name: "Video".into() })?;

    let provider = provider(&db)?;
    let cats = provider.categories();

    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].id, "desktop");
    let ids: Vec<&str> = cats[1].components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["multimedia.audio", "multimedia.video"]);
    Ok(())
}

#[test]
fn test_sources_include_inactive() -> Result<()> {
    let (_tmp, db) = open()?;
    db.add_repository(&RepositorySource::new("Solus", "https://mirrors.example/index.json", true))?;
    db.add_repository(&RepositorySource::new("Local", "/srv/local/index.json", false))?;

    let sources = provider(&db)?.sources()?;
    let described: Vec<String> = sources.iter().map(RepositorySource::describe).collect();
    assert_eq!(
        described,
        vec![
            "Solus - https://mirrors.example/index.json",
            "Local - /srv/local/index.json (inactive)",
        ]
    );
    Ok(())
}

// ── populate ─────────────────────────────────────────────────────────────────

#[test]
fn test_installed_pairs_available_view() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("nano", 3))?;
    db.insert_available(&pkg("nano", 4))?;
    db.insert_installed(&pkg("orphan", 1))?;

    let catalog = populate(&provider(&db)?, PopulationFilter::Installed, None)?;

    assert_eq!(catalog.ids(PopulationFilter::Installed), vec!["nano", "orphan"]);
    let nano = catalog.get(PopulationFilter::Installed, "nano").unwrap();
    assert!(nano.has_update());
    assert!(catalog.get(PopulationFilter::Installed, "orphan").unwrap().available().is_none());
    Ok(())
}

#[test]
fn test_installed_population_is_idempotent() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("nano", 3))?;
    db.insert_installed(&pkg("vim", 8))?;
    db.insert_available(&pkg("vim", 9))?;
    let provider = provider(&db)?;

    let first = populate(&provider, PopulationFilter::Installed, None)?;
    let second = populate(&provider, PopulationFilter::Installed, None)?;

    assert_eq!(first.ids(PopulationFilter::Installed), second.ids(PopulationFilter::Installed));
    assert_eq!(first.records(PopulationFilter::Installed), second.records(PopulationFilter::Installed));
    Ok(())
}

#[test]
fn test_search_normalizes_separators() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_available(&pkg("gnome-music", 1))?;
    db.insert_installed(&pkg("gnome_music", 1))?;
    db.insert_available(&pkg("gnomemusic", 1))?;

    let catalog = populate(&provider(&db)?, PopulationFilter::Search, Some("gnome music"))?;
    assert_eq!(catalog.ids(PopulationFilter::Search), vec!["gnome-music", "gnome_music"]);
    Ok(())
}

#[test]
fn test_search_matches_description() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut player = pkg("vlc", 1);
    player.description = "A free and open source multimedia player".into();
    db.insert_available(&player)?;

    let catalog = populate(&provider(&db)?, PopulationFilter::Search, Some("MULTIMEDIA"))?;
    assert_eq!(catalog.ids(PopulationFilter::Search), vec!["vlc"]);
    Ok(())
}

#[test]
fn test_invalid_search_yields_nothing() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_available(&pkg("firefox", 1))?;
    let provider = provider(&db)?;

    let mut catalog = Catalog::new();
    let stats = provider.populate(&mut catalog, PopulationFilter::Search, Some("firefox("), &CancelToken::new())?;

    assert_eq!(stats.added, 0);
    assert!(catalog.is_empty(PopulationFilter::Search));
    Ok(())
}

#[test]
fn test_population_stops_on_cancel() -> Result<()> {
    let (_tmp, db) = open()?;
    for name in ["a", "b", "c", "d", "e"] {
        db.insert_installed(&pkg(name, 1))?;
    }
    let provider = provider(&db)?;

    let token = CancelToken::new();
    let mut sink = CancellingSink { token: token.clone(), after: 2, received: Vec::new() };
    let stats = provider.populate(&mut sink, PopulationFilter::Installed, None, &token)?;

    assert!(stats.cancelled);
    assert_eq!(sink.received, vec!["a", "b"]);
    Ok(())
}

#[test]
fn test_recent_and_new_from_history() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_available(&dated("old-update", &["2017-01-05", "2016-12-01"]))?;
    db.insert_available(&dated("fresh-update", &["2017-11-02", "2017-10-01"]))?;
    db.insert_available(&dated("first-upload", &["2017-09-30"]))?;
    db.insert_available(&dated("undated", &[]))?;

    let provider = provider(&db)?;
    let recent = populate(&provider, PopulationFilter::Recent, None)?;
    let new = populate(&provider, PopulationFilter::New, None)?;

    let recent_ids = recent.ids(PopulationFilter::Recent);
    assert_eq!(recent_ids, vec!["fresh-update", "old-update"]);
    assert_eq!(new.ids(PopulationFilter::New), vec!["first-upload"]);
    Ok(())
}

#[test]
fn test_highlight_limit() -> Result<()> {
    let (_tmp, db) = open()?;
    for day in 1..=9 {
        let date = format!("2017-10-0{}", day);
        db.insert_available(&dated(&format!("pkg{}", day), &[date.as_str()]))?;
    }
    let config = ProviderConfig { highlight_limit: 3, ..Default::default() };
    let provider = LocalProvider::new(Arc::clone(&db), config)?;

    let mut catalog = Catalog::new();
    let stats = provider.populate(&mut catalog, PopulationFilter::New, None, &CancelToken::new())?;
    assert_eq!(stats.added, 3);
    assert!(catalog.get(PopulationFilter::New, "pkg9").is_some());
    assert!(catalog.get(PopulationFilter::New, "pkg1").is_none());
    Ok(())
}

#[test]
fn test_devel_status() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_available(&pkg("glib2-devel", 1))?;

    let record = provider(&db)?.lookup("glib2-devel")?.unwrap();
    assert!(record.has_status(ItemStatus::Devel));
    assert!(record.has_status(ItemStatus::HasChangelog));
    Ok(())
}

#[test]
fn test_unreadable_entry_is_skipped() -> Result<()> {
    let tmp = TempDir::new()?;
    {
        let raw = sled::open(tmp.path())?;
        raw.open_tree("installed")?.insert("broken", vec![0xff_u8])?;
        raw.flush()?;
    }
    let db = Arc::new(PackageDb::open(tmp.path())?);
    db.insert_installed(&pkg("nano", 1))?;
    db.insert_installed(&pkg("vim", 1))?;

    let mut catalog = Catalog::new();
    let stats = provider(&db)?.populate(&mut catalog, PopulationFilter::Installed, None, &CancelToken::new())?;

    assert_eq!(stats.added, 2);
    assert_eq!(stats.skipped, 1);
    assert!(!stats.cancelled);
    assert_eq!(catalog.ids(PopulationFilter::Installed), vec!["nano", "vim"]);
    Ok(())
}

// ── planning ─────────────────────────────────────────────────────────────────

#[test]
fn test_install_pulls_dependencies() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut app = pkg("gimp", 2);
    app.dependencies = vec![Dependency::new("gegl"), Dependency::at_least("gtk2", 5)];
    let mut gegl = pkg("gegl", 1);
    gegl.dependencies = vec![Dependency::new("babl")];
    db.insert_available(&app)?;
    db.insert_available(&gegl)?;
    db.insert_available(&pkg("babl", 1))?;
    db.insert_installed(&pkg("gtk2", 4))?;
    db.insert_available(&pkg("gtk2", 5))?;

    let provider = provider(&db)?;
    let item = provider.lookup("gimp")?.unwrap();
    let tx = provider.plan_install(&item)?;

    assert_eq!(tx.ids(SetKind::Installations), vec!["babl", "gegl", "gimp"]);
    assert_eq!(tx.ids(SetKind::Upgrades), vec!["gtk2"]);
    assert!(tx.removals().next().is_none());
    assert_eq!(tx.install_size(), 2000 + 1000 + 1000 + 5000);
    Ok(())
}

#[test]
fn test_install_removes_conflicts() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut pulse = pkg("pulseaudio", 2);
    pulse.conflicts = vec!["pipewire-pulse".into()];
    db.insert_available(&pulse)?;
    db.insert_installed(&pkg("pipewire-pulse", 1))?;

    let mut legacy = pkg("legacy-mixer", 1);
    legacy.conflicts = vec!["pulseaudio".into()];
    db.insert_installed(&legacy)?;

    let provider = provider(&db)?;
    let tx = provider.plan_install(&provider.lookup("pulseaudio")?.unwrap())?;

    assert_eq!(tx.ids(SetKind::Installations), vec!["pulseaudio"]);
    assert_eq!(tx.ids(SetKind::Removals), vec!["legacy-mixer", "pipewire-pulse"]);
    Ok(())
}

#[test]
fn test_conflict_removal_takes_dependents() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut app = pkg("app", 1);
    app.conflicts = vec!["old".into()];
    db.insert_available(&app)?;
    db.insert_installed(&pkg("old", 1))?;
    let mut user = pkg("user", 1);
    user.dependencies = vec![Dependency::new("old")];
    db.insert_installed(&user)?;
    db.insert_installed(&pkg("bystander", 1))?;

    let provider = provider(&db)?;
    let tx = provider.plan_install(&provider.lookup("app")?.unwrap())?;

    assert_eq!(tx.ids(SetKind::Installations), vec!["app"]);
    assert_eq!(tx.ids(SetKind::Removals), vec!["old", "user"]);
    Ok(())
}

#[test]
fn test_dependency_on_removed_package_fails() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut app = pkg("app", 1);
    app.dependencies = vec![Dependency::new("helper")];
    app.conflicts = vec!["old".into()];
    let mut helper = pkg("helper", 1);
    helper.dependencies = vec![Dependency::new("old")];
    db.insert_available(&app)?;
    db.insert_available(&helper)?;
    db.insert_installed(&pkg("old", 1))?;

    let provider = provider(&db)?;
    let err = provider.plan_install(&provider.lookup("app")?.unwrap()).unwrap_err();
    assert!(
        matches!(&err, CoreError::DependencyConflict { package, conflict } if package == "helper" && conflict == "old"),
        "got: {:?}",
        err
    );
    Ok(())
}

#[test]
fn test_dependency_on_package_removed_later_fails() -> Result<()> {
    // `old` is already satisfied when `app` is walked and only removed afterwards
    let (_tmp, db) = open()?;
    let mut app = pkg("app", 1);
    app.dependencies = vec![Dependency::new("old"), Dependency::new("breaker")];
    let mut breaker = pkg("breaker", 1);
    breaker.conflicts = vec!["old".into()];
    db.insert_available(&app)?;
    db.insert_available(&breaker)?;
    db.insert_installed(&pkg("old", 1))?;

    let provider = provider(&db)?;
    let err = provider.plan_install(&provider.lookup("app")?.unwrap()).unwrap_err();
    assert!(
        matches!(&err, CoreError::DependencyConflict { package, conflict } if package == "app" && conflict == "old"),
        "got: {:?}",
        err
    );
    Ok(())
}

#[test]
fn test_conflict_with_pulled_in_dependency_fails() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut app = pkg("app", 1);
    app.dependencies = vec![Dependency::new("libnew")];
    app.conflicts = vec!["libnew".into()];
    db.insert_available(&app)?;
    db.insert_available(&pkg("libnew", 1))?;

    let provider = provider(&db)?;
    let err = provider.plan_install(&provider.lookup("app")?.unwrap()).unwrap_err();
    assert!(
        matches!(&err, CoreError::DependencyConflict { package, conflict } if package == "app" && conflict == "libnew"),
        "got: {:?}",
        err
    );
    Ok(())
}

#[test]
fn test_install_missing_dependency() -> Result<()> {
    let (_tmp, db) = open()?;
    let mut app = pkg("app", 1);
    app.dependencies = vec![Dependency::new("nowhere")];
    db.insert_available(&app)?;

    let provider = provider(&db)?;
    let err = provider.plan_install(&provider.lookup("app")?.unwrap()).unwrap_err();
    assert!(matches!(err, CoreError::PackageNotFound(name) if name == "nowhere"));
    Ok(())
}

#[test]
fn test_install_already_installed() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("nano", 1))?;
    db.insert_available(&pkg("nano", 1))?;

    let provider = provider(&db)?;
    let err = provider.plan_install(&provider.lookup("nano")?.unwrap()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidOperation { .. }));
    Ok(())
}

#[test]
fn test_remove_takes_reverse_dependencies() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("libfoo", 1))?;
    let mut bar = pkg("bar", 1);
    bar.dependencies = vec![Dependency::new("libfoo")];
    let mut baz = pkg("baz", 1);
    baz.dependencies = vec![Dependency::new("bar")];
    db.insert_installed(&bar)?;
    db.insert_installed(&baz)?;
    db.insert_installed(&pkg("unrelated", 1))?;

    let provider = provider(&db)?;
    let tx = provider.plan_remove(&provider.lookup("libfoo")?.unwrap())?;

    assert_eq!(tx.ids(SetKind::Removals), vec!["bar", "baz", "libfoo"]);
    assert_eq!(tx.removal_size(), 3000);
    Ok(())
}

#[test]
fn test_upgrade_requires_newer_release() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("nano", 4))?;
    db.insert_available(&pkg("nano", 4))?;
    db.insert_installed(&pkg("vim", 8))?;
    db.insert_available(&pkg("vim", 9))?;

    let provider = provider(&db)?;
    assert!(provider.plan_upgrade(&provider.lookup("nano")?.unwrap()).is_err());

    let tx = provider.plan_upgrade(&provider.lookup("vim")?.unwrap())?;
    assert_eq!(tx.ids(SetKind::Upgrades), vec!["vim"]);
    Ok(())
}

#[test]
fn test_planning_does_not_touch_database() -> Result<()> {
    let (_tmp, db) = open()?;
    db.insert_installed(&pkg("libfoo", 1))?;
    let provider = provider(&db)?;

    provider.plan_remove(&provider.lookup("libfoo")?.unwrap())?;
    assert!(db.has_installed("libfoo")?);
    Ok(())
}
