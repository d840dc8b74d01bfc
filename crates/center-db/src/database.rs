//! Database operations and management

use anyhow::{Context, Result};
use center_core::{PackageMeta, RepositorySource};
use regex::Regex;
use sled::Db;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::snapshot::{ComponentEntry, GroupEntry, ImportStats, RepositoryIndex, Snapshot};
use crate::storage::{
    pack_component, pack_group, pack_package, pack_repository, unpack_component, unpack_group,
    unpack_package, unpack_repository,
};

/// Local package database
///
/// Holds what the package manager knows about the system: the installed
/// database, the available (repository) database, the group/component
/// category tree and the configured repositories.
pub struct PackageDb {
    /// Installed packages (key: package name)
    installed: sled::Tree,

    /// Packages offered by the repositories (key: package name)
    available: sled::Tree,

    /// Top level groups (key: group id)
    groups: sled::Tree,

    /// Components (key: component id)
    components: sled::Tree,

    /// Repositories (key: repository name)
    repositories: sled::Tree,

    /// Sled database instance
    db: Db,

    /// Path to the database directory (for size calculation)
    path: PathBuf,
}

impl PackageDb {
    /// Opens or creates a new database at the specified location
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        let open = |name: &str| {
            db.open_tree(name)
                .with_context(|| format!("Failed to open {} tree", name))
        };

        Ok(Self {
            installed: open("installed")?,
            available: open("available")?,
            groups: open("groups")?,
            components: open("components")?,
            repositories: open("repositories")?,
            path: path.as_ref().to_path_buf(),
            db,
        })
    }

    // ── packages ────────────────────────────────────────────────────────────

    /// Records a package as installed, replacing any previous snapshot
    pub fn insert_installed(&self, meta: &PackageMeta) -> Result<()> {
        let bytes = pack_package(meta)?;
        self.installed
            .insert(meta.name.as_bytes(), bytes)
            .with_context(|| format!("Failed to store installed package {}", meta.name))?;
        Ok(())
    }

    /// Records a package as available, replacing any previous snapshot
    pub fn insert_available(&self, meta: &PackageMeta) -> Result<()> {
        let bytes = pack_package(meta)?;
        self.available
            .insert(meta.name.as_bytes(), bytes)
            .with_context(|| format!("Failed to store available package {}", meta.name))?;
        Ok(())
    }

    pub fn remove_installed(&self, name: &str) -> Result<bool> {
        Ok(self
            .installed
            .remove(name.as_bytes())
            .with_context(|| format!("Failed to remove installed package {}", name))?
            .is_some())
    }

    pub fn get_installed(&self, name: &str) -> Result<Option<PackageMeta>> {
        get_package(&self.installed, name)
    }

    pub fn get_available(&self, name: &str) -> Result<Option<PackageMeta>> {
        get_package(&self.available, name)
    }

    pub fn has_installed(&self, name: &str) -> Result<bool> {
        Ok(self.installed.contains_key(name.as_bytes())?)
    }

    pub fn has_available(&self, name: &str) -> Result<bool> {
        Ok(self.available.contains_key(name.as_bytes())?)
    }

    /// Names of all installed packages, sorted
    pub fn list_installed(&self) -> Result<Vec<String>> {
        list_names(&self.installed)
    }

    /// Names of all available packages, sorted
    pub fn list_available(&self) -> Result<Vec<String>> {
        list_names(&self.available)
    }

    /// Every available package snapshot, sorted by name
    pub fn available_packages(&self) -> Result<Vec<PackageMeta>> {
        let mut results = Vec::new();
        for item in self.available.iter() {
            let (_, value) = item.context("Failed to read from database")?;
            results.push(unpack_package(&value)?);
        }
        Ok(results)
    }

    /// Installed packages whose name, summary or description matches
    pub fn search_installed(&self, pattern: &Regex) -> Result<Vec<String>> {
        search_tree(&self.installed, pattern)
    }

    /// Available packages whose name, summary or description matches
    pub fn search_available(&self, pattern: &Regex) -> Result<Vec<String>> {
        search_tree(&self.available, pattern)
    }

    /// Installed packages for which the repositories offer a newer release
    pub fn list_upgradable(&self) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for item in self.installed.iter() {
            let (_, value) = item.context("Failed to read from database")?;
            let installed = unpack_package(&value)?;
            if let Some(available) = self.get_available(&installed.name)? {
                if available.release() > installed.release() {
                    results.push(installed.name);
                }
            }
        }
        Ok(results)
    }

    /// Installed packages that directly depend on `name`
    pub fn reverse_dependencies(&self, name: &str) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for item in self.installed.iter() {
            let (_, value) = item.context("Failed to read from database")?;
            let meta = unpack_package(&value)?;
            if meta.dependencies.iter().any(|d| d.name == name) {
                results.push(meta.name);
            }
        }
        Ok(results)
    }

    // ── categories ──────────────────────────────────────────────────────────

    pub fn insert_group(&self, group: &GroupEntry) -> Result<()> {
        self.groups
            .insert(group.id.as_bytes(), pack_group(group)?)
            .with_context(|| format!("Failed to store group {}", group.id))?;
        Ok(())
    }

    pub fn insert_component(&self, component: &ComponentEntry) -> Result<()> {
        self.components
            .insert(component.id.as_bytes(), pack_component(component)?)
            .with_context(|| format!("Failed to store component {}", component.id))?;
        Ok(())
    }

    /// Group ids, sorted
    pub fn list_groups(&self) -> Result<Vec<String>> {
        list_names(&self.groups)
    }

    pub fn get_group(&self, id: &str) -> Result<Option<GroupEntry>> {
        match self.groups.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(unpack_group(id, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Component ids owned by a group, in stored order
    pub fn group_components(&self, id: &str) -> Result<Vec<String>> {
        Ok(self
            .get_group(id)?
            .map(|g| g.components)
            .unwrap_or_default())
    }

    pub fn get_component(&self, id: &str) -> Result<Option<ComponentEntry>> {
        match self.components.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(unpack_component(id, &bytes)?)),
            None => Ok(None),
        }
    }

    // ── repositories ────────────────────────────────────────────────────────

    /// Adds or updates a repository; a new one is appended after the others
    pub fn add_repository(&self, source: &RepositorySource) -> Result<()> {
        let position = match self.repositories.get(source.name.as_bytes())? {
            Some(bytes) => unpack_repository(&source.name, &bytes)?.0,
            None => self.repositories.len() as u32,
        };
        self.repositories
            .insert(source.name.as_bytes(), pack_repository(position, source)?)
            .with_context(|| format!("Failed to store repository {}", source.name))?;
        Ok(())
    }

    /// All repositories, active or not, in the order they were added
    pub fn list_repositories(&self) -> Result<Vec<RepositorySource>> {
        let mut results = Vec::new();
        for item in self.repositories.iter() {
            let (key, value) = item.context("Failed to read from database")?;
            let name = String::from_utf8_lossy(&key).into_owned();
            results.push(unpack_repository(&name, &value)?);
        }
        results.sort_by_key(|(position, _)| *position);
        Ok(results.into_iter().map(|(_, source)| source).collect())
    }

    pub fn get_repository(&self, name: &str) -> Result<Option<RepositorySource>> {
        match self.repositories.get(name.as_bytes())? {
            Some(bytes) => Ok(Some(unpack_repository(name, &bytes)?.1)),
            None => Ok(None),
        }
    }

    // ── import ──────────────────────────────────────────────────────────────

    /// Writes a whole snapshot into the database
    ///
    /// The category tree is replaced wholesale; packages and repositories
    /// present in the snapshot overwrite existing entries of the same name.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        for source in &snapshot.repositories {
            self.add_repository(source)?;
            stats.repositories += 1;
        }

        self.groups.clear().context("Failed to clear groups")?;
        self.components.clear().context("Failed to clear components")?;
        for group in &snapshot.groups {
            self.insert_group(group)?;
            stats.groups += 1;
        }
        for component in &snapshot.components {
            self.insert_component(component)?;
            stats.components += 1;
        }

        for meta in &snapshot.installed {
            self.insert_installed(meta)?;
            stats.installed += 1;
        }
        for meta in &snapshot.available {
            self.insert_available(meta)?;
            stats.available += 1;
        }

        log::info!("Imported snapshot: {}", stats);
        Ok(stats)
    }

    /// Replaces the available packages of one repository with a fresh index
    ///
    /// Packages previously published by `repository` but missing from the new
    /// index are dropped. Returns the number of packages written.
    pub fn import_repository_index(&self, repository: &str, index: &RepositoryIndex) -> Result<usize> {
        let fresh: HashSet<&str> = index.packages.iter().map(|p| p.name.as_str()).collect();

        for item in self.available.iter() {
            let (key, value) = item.context("Failed to read from database")?;
            let meta = unpack_package(&value)?;
            if meta.repository.as_deref() == Some(repository) && !fresh.contains(meta.name.as_str()) {
                log::debug!("Dropping {} (no longer in {})", meta.name, repository);
                self.available.remove(key).context("Failed to remove stale package")?;
            }
        }

        for meta in &index.packages {
            let mut meta = meta.clone();
            meta.repository = Some(repository.to_string());
            self.insert_available(&meta)?;
        }

        Ok(index.packages.len())
    }

    // ── statistics ──────────────────────────────────────────────────────────

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.len()
    }

    /// Checks if database is empty (nothing imported yet)
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.available.is_empty()
    }

    /// Returns total on-disk size of the database directory in bytes.
    pub fn db_size_bytes(&self) -> u64 {
        fn dir_size(path: &Path) -> u64 {
            let Ok(entries) = std::fs::read_dir(path) else { return 0; };
            entries
                .flatten()
                .map(|e| {
                    let p = e.path();
                    if p.is_dir() {
                        dir_size(&p)
                    } else {
                        e.metadata().map(|m| m.len()).unwrap_or(0)
                    }
                })
                .sum()
        }
        dir_size(&self.path)
    }

    /// Flushes all pending operations to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }
}

fn get_package(tree: &sled::Tree, name: &str) -> Result<Option<PackageMeta>> {
    match tree.get(name.as_bytes())? {
        Some(bytes) => {
            let meta = unpack_package(&bytes)
                .with_context(|| format!("Corrupted entry for {}", name))?;
            Ok(Some(meta))
        }
        None => Ok(None),
    }
}

fn list_names(tree: &sled::Tree) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for key in tree.iter().keys() {
        let key = key.context("Failed to read from database")?;
        names.push(String::from_utf8_lossy(&key).into_owned());
    }
    Ok(names)
}

fn search_tree(tree: &sled::Tree, pattern: &Regex) -> Result<Vec<String>> {
    let mut matches = BTreeSet::new();
    for item in tree.iter() {
        let (_, value) = item.context("Failed to read from database")?;
        let meta = match unpack_package(&value) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping unreadable entry during search: {:?}", e);
                continue;
            }
        };
        if pattern.is_match(&meta.name)
            || pattern.is_match(&meta.summary)
            || pattern.is_match(&meta.description)
        {
            matches.insert(meta.name);
        }
    }
    Ok(matches.into_iter().collect())
}

/// Resolves a repository URL to a local index file, if it points to one
///
/// Accepts `file://` URLs and plain filesystem paths; anything else is a
/// remote repository that the system package manager downloads itself.
pub fn local_index_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}
