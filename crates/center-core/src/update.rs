//! Security classification of pending updates

use crate::package::{HistoryEntry, PackageMeta};

/// A pending update: the installed release (if any) and the candidate package
#[derive(Debug, Clone)]
pub struct UpdateCandidate {
    old_release: Option<u32>,
    new_package: PackageMeta,
    history_slice: Vec<HistoryEntry>,
    security: bool,
}

impl UpdateCandidate {
    /// Classifies an update from the installed release to `new_package`
    ///
    /// With no installed release there is nothing to compare against and the
    /// candidate is never a security update.
    pub fn new(old_release: Option<u32>, new_package: PackageMeta) -> Self {
        let (history_slice, security) = match old_release {
            Some(old) => {
                let slice = history_between(old, &new_package);
                let security = slice.iter().any(HistoryEntry::is_security);
                (slice, security)
            }
            None => (Vec::new(), false),
        };

        Self {
            old_release,
            new_package,
            history_slice,
            security,
        }
    }

    /// Convenience constructor from the installed snapshot
    ///
    /// An installed snapshot without history has no release to compare, so it
    /// is classified like a fresh install (empty slice, never security).
    pub fn from_packages(installed: Option<&PackageMeta>, candidate: PackageMeta) -> Self {
        let old_release = installed.and_then(PackageMeta::release);
        if installed.is_some() && old_release.is_none() {
            log::debug!(
                "Installed {} has no release history, treating update as non-security",
                candidate.name
            );
        }
        Self::new(old_release, candidate)
    }

    pub fn name(&self) -> &str {
        &self.new_package.name
    }

    pub fn old_release(&self) -> Option<u32> {
        self.old_release
    }

    pub fn new_package(&self) -> &PackageMeta {
        &self.new_package
    }

    /// Releases newer than the installed one, newest first
    pub fn history_slice(&self) -> &[HistoryEntry] {
        &self.history_slice
    }

    pub fn is_security_update(&self) -> bool {
        self.security
    }
}

/// Every history entry strictly newer than `old_release`, newest first
pub fn history_between(old_release: u32, new: &PackageMeta) -> Vec<HistoryEntry> {
    let mut ret: Vec<HistoryEntry> = new
        .history
        .iter()
        .filter(|h| h.release > old_release)
        .cloned()
        .collect();
    ret.sort_by(|a, b| b.release.cmp(&a.release));
    ret
}
