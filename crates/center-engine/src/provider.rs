//! Provider backed by the local package database

use center_core::{
    CancelToken, Component, Group, PackageRecord, PopulateStats, PopulationFilter, Provider,
    RepositorySource, Result, Sink, Transaction,
};
use center_db::PackageDb;
use std::sync::Arc;

/// Tunables for [`LocalProvider`]
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Identifier records produced by this provider carry as their origin
    pub id: String,
    /// Maximum number of packages in the recent and new lists
    pub highlight_limit: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: "local".to_string(),
            highlight_limit: 5,
        }
    }
}

/// Provider over the local package database
pub struct LocalProvider {
    pub(crate) db: Arc<PackageDb>,

    pub(crate) config: ProviderConfig,

    /// Category tree, built once
    categories: Vec<Group>,
}

impl LocalProvider {
    /// Creates a provider and builds its category tree
    pub fn new(db: Arc<PackageDb>, config: ProviderConfig) -> anyhow::Result<Self> {
        let categories = build_categories(&db)?;
        log::debug!(
            "Provider {} ready with {} categories",
            config.id,
            categories.len()
        );
        Ok(Self {
            db,
            config,
            categories,
        })
    }

    pub fn db(&self) -> &PackageDb {
        &self.db
    }

    /// Record for `name` pairing whatever both databases know about it
    pub fn lookup(&self, name: &str) -> Result<Option<PackageRecord>> {
        let installed = self.db.get_installed(name)?;
        let available = self.db.get_available(name)?;
        if installed.is_none() && available.is_none() {
            return Ok(None);
        }
        Ok(Some(PackageRecord::new(&self.config.id, installed, available)?))
    }
}

/// Finds all groups and their components and nests them, both sorted by id
fn build_categories(db: &PackageDb) -> anyhow::Result<Vec<Group>> {
    let mut cats = Vec::new();
    let mut groups = db.list_groups()?;
    groups.sort();

    for group_id in groups {
        let Some(entry) = db.get_group(&group_id)? else {
            continue;
        };
        let mut group = Group::new(&entry.id, &entry.name, &entry.icon);

        let mut components = entry.components.clone();
        components.sort();
        for comp_id in components {
            match db.get_component(&comp_id)? {
                Some(comp) => group.components.push(Component::new(comp.id, comp.name)),
                None => log::warn!("Group {} lists unknown component {}", group_id, comp_id),
            }
        }

        cats.push(group);
    }

    Ok(cats)
}

impl Provider for LocalProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn categories(&self) -> &[Group] {
        &self.categories
    }

    fn sources(&self) -> Result<Vec<RepositorySource>> {
        Ok(self.db.list_repositories()?)
    }

    fn populate(
        &self,
        sink: &mut dyn Sink,
        filter: PopulationFilter,
        query: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<PopulateStats> {
        let stats = match filter {
            PopulationFilter::Installed => self.populate_installed(sink, cancel)?,
            PopulationFilter::Search => self.populate_search(sink, query.unwrap_or(""), cancel)?,
            PopulationFilter::Recent => self.populate_recent(sink, cancel)?,
            PopulationFilter::New => self.populate_new(sink, cancel)?,
        };
        log::info!("{} [{}]: {}", self.config.id, filter, stats);
        Ok(stats)
    }

    fn plan_install(&self, item: &PackageRecord) -> Result<Transaction> {
        self.compute_install(item)
    }

    fn plan_remove(&self, item: &PackageRecord) -> Result<Transaction> {
        self.compute_remove(item)
    }

    fn plan_upgrade(&self, item: &PackageRecord) -> Result<Transaction> {
        self.compute_upgrade(item)
    }
}
