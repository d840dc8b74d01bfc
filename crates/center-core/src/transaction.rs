//! Transaction plans: what an operation would install, remove and upgrade

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::package::PackageRecord;

/// Operation a user can request on a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Install,
    Remove,
    Upgrade,
    /// Whole-system upgrade, queued for the transaction executor only
    SystemUpgrade,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Install => write!(f, "install"),
            OperationKind::Remove => write!(f, "remove"),
            OperationKind::Upgrade => write!(f, "upgrade"),
            OperationKind::SystemUpgrade => write!(f, "system-upgrade"),
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "install" => Ok(OperationKind::Install),
            "remove" => Ok(OperationKind::Remove),
            "upgrade" => Ok(OperationKind::Upgrade),
            "system-upgrade" => Ok(OperationKind::SystemUpgrade),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// The three sets of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetKind {
    Installations,
    Removals,
    Upgrades,
}

impl SetKind {
    pub const ALL: [SetKind; 3] = [SetKind::Installations, SetKind::Removals, SetKind::Upgrades];

    pub fn label(&self) -> &'static str {
        match self {
            SetKind::Installations => "installation",
            SetKind::Removals => "removal",
            SetKind::Upgrades => "upgrade",
        }
    }
}

/// Full effect of one requested operation, dependencies included
///
/// The three sets are keyed by package id and are pairwise disjoint: an id can
/// be installed, removed or upgraded, never two of those at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    installations: BTreeMap<String, PackageRecord>,
    removals: BTreeMap<String, PackageRecord>,
    upgrades: BTreeMap<String, PackageRecord>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: SetKind) -> &BTreeMap<String, PackageRecord> {
        match kind {
            SetKind::Installations => &self.installations,
            SetKind::Removals => &self.removals,
            SetKind::Upgrades => &self.upgrades,
        }
    }

    fn set_mut(&mut self, kind: SetKind) -> &mut BTreeMap<String, PackageRecord> {
        match kind {
            SetKind::Installations => &mut self.installations,
            SetKind::Removals => &mut self.removals,
            SetKind::Upgrades => &mut self.upgrades,
        }
    }

    /// Which set, if any, already holds `id`
    pub fn set_of(&self, id: &str) -> Option<SetKind> {
        SetKind::ALL.into_iter().find(|kind| self.set(*kind).contains_key(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.set_of(id).is_some()
    }

    /// Adds a record to one set
    ///
    /// Returns `Ok(false)` if the id is already in that same set and fails with
    /// [`CoreError::ConflictingTransaction`] if it sits in a different one.
    pub fn add(&mut self, kind: SetKind, record: PackageRecord) -> Result<bool> {
        match self.set_of(record.id()) {
            Some(existing) if existing == kind => Ok(false),
            Some(existing) => Err(CoreError::ConflictingTransaction {
                id: record.id().to_string(),
                existing: existing.label(),
            }),
            None => {
                self.set_mut(kind).insert(record.id().to_string(), record);
                Ok(true)
            }
        }
    }

    pub fn entries(&self, kind: SetKind) -> impl Iterator<Item = &PackageRecord> {
        self.set(kind).values()
    }

    pub fn ids(&self, kind: SetKind) -> Vec<&str> {
        self.set(kind).keys().map(String::as_str).collect()
    }

    pub fn installations(&self) -> impl Iterator<Item = &PackageRecord> {
        self.entries(SetKind::Installations)
    }

    pub fn removals(&self) -> impl Iterator<Item = &PackageRecord> {
        self.entries(SetKind::Removals)
    }

    pub fn upgrades(&self) -> impl Iterator<Item = &PackageRecord> {
        self.entries(SetKind::Upgrades)
    }

    pub fn len(&self, kind: SetKind) -> usize {
        self.set(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        SetKind::ALL.iter().all(|kind| self.set(*kind).is_empty())
    }

    /// Bytes the installations and upgrades occupy once installed
    pub fn install_size(&self) -> u64 {
        self.installations()
            .chain(self.upgrades())
            .filter_map(|r| r.available().and_then(|m| m.install_size))
            .sum()
    }

    /// Bytes freed by the removals
    pub fn removal_size(&self) -> u64 {
        self.removals()
            .filter_map(|r| r.installed().and_then(|m| m.install_size))
            .sum()
    }

    /// Bytes to download for installations and upgrades
    pub fn download_size(&self) -> u64 {
        self.installations()
            .chain(self.upgrades())
            .filter_map(|r| r.available().and_then(|m| m.package_size))
            .sum()
    }
}
