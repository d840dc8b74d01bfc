//! JSON snapshot format used to fill the database

use anyhow::{Context, Result};
use center_core::{PackageMeta, RepositorySource};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top level category as written in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    /// Component ids owned by this group
    #[serde(default)]
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentEntry {
    pub id: String,
    pub name: String,
}

/// Complete picture of one system: repositories, categories and both
/// package databases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub repositories: Vec<RepositorySource>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub installed: Vec<PackageMeta>,
    #[serde(default)]
    pub available: Vec<PackageMeta>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read snapshot {:?}", path.as_ref()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {:?}", path.as_ref()))
    }
}

/// Package index published by one repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryIndex {
    #[serde(default)]
    pub packages: Vec<PackageMeta>,
}

impl RepositoryIndex {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read repository index {:?}", path.as_ref()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse repository index {:?}", path.as_ref()))
    }
}

/// Counts of what an import wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub repositories: usize,
    pub groups: usize,
    pub components: usize,
    pub installed: usize,
    pub available: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repositories: {} | Groups: {} ({} components) | Packages: {} installed, {} available",
            self.repositories, self.groups, self.components, self.installed, self.available
        )
    }
}
