//! Package metadata and the unified installed/available record

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{CoreError, Result};

/// One release in a package's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Monotonically increasing release number
    #[serde(deserialize_with = "deserialize_release")]
    pub release: u32,

    /// Upstream version string of this release (e.g. "3.26.1")
    pub version: String,

    /// Change type tag (e.g. "security", "bug")
    #[serde(rename = "type", default)]
    pub update_type: String,

    /// Release date in `YYYY-MM-DD` form
    #[serde(default)]
    pub date: Option<String>,

    /// Changelog comment
    #[serde(default)]
    pub comment: Option<String>,
}

impl HistoryEntry {
    pub fn new(release: u32, version: impl Into<String>, update_type: impl Into<String>) -> Self {
        Self {
            release,
            version: version.into(),
            update_type: update_type.into(),
            date: None,
            comment: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn is_security(&self) -> bool {
        self.update_type == "security"
    }
}

/// Runtime dependency on another package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,

    /// Minimum release the dependency must be at, if any
    #[serde(default)]
    pub release_from: Option<u32>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), release_from: None }
    }

    pub fn at_least(name: impl Into<String>, release: u32) -> Self {
        Self { name: name.into(), release_from: Some(release) }
    }
}

/// Metadata snapshot of a package as one database sees it
///
/// The installed database and the available (repository) database each
/// provide their own snapshot; [`PackageRecord`] pairs them up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageMeta {
    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    /// Component id this package belongs to (e.g. "multimedia.audio")
    #[serde(default)]
    pub component: Option<String>,

    /// Release history, newest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Names of packages that cannot be installed alongside this one
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Size on disk once installed, in bytes
    #[serde(default)]
    pub install_size: Option<u64>,

    /// Download size, in bytes
    #[serde(default)]
    pub package_size: Option<u64>,

    /// Repository this snapshot was read from
    #[serde(default)]
    pub repository: Option<String>,
}

impl PackageMeta {
    /// Creates a bare package snapshot with a name only
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            description: String::new(),
            component: None,
            history: Vec::new(),
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            install_size: None,
            package_size: None,
            repository: None,
        }
    }

    /// Highest release number present in the history
    pub fn release(&self) -> Option<u32> {
        self.history.iter().map(|h| h.release).max()
    }

    /// History entry with the highest release number
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.iter().max_by_key(|h| h.release)
    }

    /// Version string of the newest release
    pub fn version(&self) -> Option<&str> {
        self.latest().map(|h| h.version.as_str())
    }
}

/// Status tags derived from a record's name and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemStatus {
    /// The displayed metadata carries a release history
    HasChangelog,
    /// Development headers or debug symbols
    Devel,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::HasChangelog => write!(f, "has-changelog"),
            ItemStatus::Devel => write!(f, "is-devel-or-debug"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Views {
    Installed(PackageMeta),
    Available(PackageMeta),
    Both {
        installed: PackageMeta,
        available: PackageMeta,
    },
}

/// Unified view of one package across the installed and available databases
///
/// A record always holds at least one snapshot. It is immutable: a refresh
/// builds a new record rather than mutating an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Id of the provider that produced this record
    origin: String,
    views: Views,
    status: BTreeSet<ItemStatus>,
}

impl PackageRecord {
    /// Builds a record from the installed and available snapshots
    ///
    /// Fails with [`CoreError::InvalidRecord`] when both are absent.
    pub fn new(
        origin: impl Into<String>,
        installed: Option<PackageMeta>,
        available: Option<PackageMeta>,
    ) -> Result<Self> {
        let views = match (installed, available) {
            (Some(installed), Some(available)) => Views::Both { installed, available },
            (Some(installed), None) => Views::Installed(installed),
            (None, Some(available)) => Views::Available(available),
            (None, None) => {
                return Err(CoreError::InvalidRecord(
                    "neither installed nor available metadata present".to_string(),
                ))
            }
        };

        let mut record = Self {
            origin: origin.into(),
            views,
            status: BTreeSet::new(),
        };
        record.status = record.derive_status();
        Ok(record)
    }

    fn derive_status(&self) -> BTreeSet<ItemStatus> {
        let mut status = BTreeSet::new();
        let display = self.display();
        if !display.history.is_empty() {
            status.insert(ItemStatus::HasChangelog);
        }
        if display.name.ends_with("-devel") || display.name.ends_with("-dbginfo") {
            status.insert(ItemStatus::Devel);
        }
        status
    }

    /// Stable identifier, unique within the provider's namespace
    pub fn id(&self) -> &str {
        &self.display().name
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn installed(&self) -> Option<&PackageMeta> {
        match &self.views {
            Views::Installed(installed) | Views::Both { installed, .. } => Some(installed),
            Views::Available(_) => None,
        }
    }

    pub fn available(&self) -> Option<&PackageMeta> {
        match &self.views {
            Views::Available(available) | Views::Both { available, .. } => Some(available),
            Views::Installed(_) => None,
        }
    }

    /// Installed snapshot if present, otherwise the available one
    pub fn display(&self) -> &PackageMeta {
        match &self.views {
            Views::Installed(installed) | Views::Both { installed, .. } => installed,
            Views::Available(available) => available,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed().is_some()
    }

    pub fn status(&self) -> &BTreeSet<ItemStatus> {
        &self.status
    }

    pub fn has_status(&self, status: ItemStatus) -> bool {
        self.status.contains(&status)
    }

    /// True when the available release is newer than the installed one
    pub fn has_update(&self) -> bool {
        match (self.installed(), self.available()) {
            (Some(installed), Some(available)) => available.release() > installed.release(),
            _ => false,
        }
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display = self.display();
        write!(f, "{} {}", display.name, display.version().unwrap_or("-"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReleaseRepr {
    Number(u32),
    Text(String),
}

/// Accepts releases written as JSON numbers or numeric strings
fn deserialize_release<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match ReleaseRepr::deserialize(deserializer)? {
        ReleaseRepr::Number(n) => Ok(n),
        ReleaseRepr::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid release number: {:?}", s))),
    }
}
