//! Compact binary storage format
//!
//! Snapshots arrive as JSON but are stored in sled with bincode. The stored
//! types mirror the public models without any serde attributes bincode cannot
//! honour (untagged enums, skipped fields).

use anyhow::{Context, Result};
use center_core::{Dependency, HistoryEntry, PackageMeta, RepositorySource};
use serde::{Deserialize, Serialize};

use crate::snapshot::{ComponentEntry, GroupEntry};

#[derive(Serialize, Deserialize)]
struct StoredHistory {
    release: u32,
    version: String,
    update_type: String,
    date: Option<String>,
    comment: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredDependency {
    name: String,
    release_from: Option<u32>,
}

#[derive(Serialize, Deserialize)]
struct StoredPackage {
    name: String,
    summary: String,
    description: String,
    component: Option<String>,
    history: Vec<StoredHistory>,
    dependencies: Vec<StoredDependency>,
    conflicts: Vec<String>,
    install_size: Option<u64>,
    package_size: Option<u64>,
    repository: Option<String>,
}

/// Serialize a `PackageMeta` into compact binary bytes.
pub(crate) fn pack_package(meta: &PackageMeta) -> Result<Vec<u8>> {
    let stored = StoredPackage {
        name: meta.name.clone(),
        summary: meta.summary.clone(),
        description: meta.description.clone(),
        component: meta.component.clone(),
        history: meta
            .history
            .iter()
            .map(|h| StoredHistory {
                release: h.release,
                version: h.version.clone(),
                update_type: h.update_type.clone(),
                date: h.date.clone(),
                comment: h.comment.clone(),
            })
            .collect(),
        dependencies: meta
            .dependencies
            .iter()
            .map(|d| StoredDependency {
                name: d.name.clone(),
                release_from: d.release_from,
            })
            .collect(),
        conflicts: meta.conflicts.clone(),
        install_size: meta.install_size,
        package_size: meta.package_size,
        repository: meta.repository.clone(),
    };
    bincode::serialize(&stored).context("Failed to serialize PackageMeta")
}

/// Deserialize a `PackageMeta` from compact binary bytes.
pub(crate) fn unpack_package(bytes: &[u8]) -> Result<PackageMeta> {
    let stored: StoredPackage =
        bincode::deserialize(bytes).context("Failed to deserialize PackageMeta")?;
    Ok(PackageMeta {
        name: stored.name,
        summary: stored.summary,
        description: stored.description,
        component: stored.component,
        history: stored
            .history
            .into_iter()
            .map(|h| HistoryEntry {
                release: h.release,
                version: h.version,
                update_type: h.update_type,
                date: h.date,
                comment: h.comment,
            })
            .collect(),
        dependencies: stored
            .dependencies
            .into_iter()
            .map(|d| Dependency {
                name: d.name,
                release_from: d.release_from,
            })
            .collect(),
        conflicts: stored.conflicts,
        install_size: stored.install_size,
        package_size: stored.package_size,
        repository: stored.repository,
    })
}

#[derive(Serialize, Deserialize)]
struct StoredGroup {
    name: String,
    icon: String,
    components: Vec<String>,
}

pub(crate) fn pack_group(group: &GroupEntry) -> Result<Vec<u8>> {
    let stored = StoredGroup {
        name: group.name.clone(),
        icon: group.icon.clone(),
        components: group.components.clone(),
    };
    bincode::serialize(&stored).context("Failed to serialize group")
}

pub(crate) fn unpack_group(id: &str, bytes: &[u8]) -> Result<GroupEntry> {
    let stored: StoredGroup = bincode::deserialize(bytes).context("Failed to deserialize group")?;
    Ok(GroupEntry {
        id: id.to_string(),
        name: stored.name,
        icon: stored.icon,
        components: stored.components,
    })
}

pub(crate) fn pack_component(component: &ComponentEntry) -> Result<Vec<u8>> {
    bincode::serialize(&component.name).context("Failed to serialize component")
}

pub(crate) fn unpack_component(id: &str, bytes: &[u8]) -> Result<ComponentEntry> {
    let name: String = bincode::deserialize(bytes).context("Failed to deserialize component")?;
    Ok(ComponentEntry {
        id: id.to_string(),
        name,
    })
}

/// Repositories keep the position they were added at so listing preserves
/// the configured order.
#[derive(Serialize, Deserialize)]
struct StoredRepository {
    position: u32,
    url: String,
    active: bool,
}

pub(crate) fn pack_repository(position: u32, source: &RepositorySource) -> Result<Vec<u8>> {
    let stored = StoredRepository {
        position,
        url: source.url.clone(),
        active: source.active,
    };
    bincode::serialize(&stored).context("Failed to serialize repository")
}

pub(crate) fn unpack_repository(name: &str, bytes: &[u8]) -> Result<(u32, RepositorySource)> {
    let stored: StoredRepository =
        bincode::deserialize(bytes).context("Failed to deserialize repository")?;
    Ok((
        stored.position,
        RepositorySource::new(name, stored.url, stored.active),
    ))
}
