//! Background update checks
//!
//! One cycle: connectivity gate, repository refresh, enumerate upgradable
//! packages, classify each one and raise at most one notification. Every
//! failure along the way ends the cycle quietly; the next scheduled cycle
//! simply tries again.

use anyhow::{Context, Result};
use center_core::{PackageMeta, UpdateCandidate};
use center_db::{local_index_path, RepositoryIndex};
use std::fmt;
use std::time::Duration;

use crate::provider::LocalProvider;

/// How long notifications stay on screen
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(12000);

/// Action id that asks for the catalog UI to be raised
pub const OPEN_CENTER_ACTION: &str = "open-sc";

/// Source of the "network available" signal
pub trait Connectivity: Send + Sync {
    fn network_available(&self) -> bool;
}

/// Package-manager operations an update cycle needs
pub trait UpdateBackend: Send + Sync {
    /// Refreshes repository metadata
    fn refresh_repositories(&self) -> Result<()>;

    /// Names of installed packages with a newer release available
    fn list_upgradable(&self) -> Result<Vec<String>>;

    fn installed_package(&self, name: &str) -> Result<Option<PackageMeta>>;

    fn available_package(&self, name: &str) -> Result<Option<PackageMeta>>;
}

/// Delivers notifications to the desktop (or wherever)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Connectivity with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedConnectivity(pub bool);

impl Connectivity for FixedConnectivity {
    fn network_available(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub urgency: Urgency,
    pub timeout: Duration,
    pub action: Option<NotificationAction>,
}

impl Notification {
    fn new(title: &str, body: &str, icon: &str, urgency: Urgency) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            icon: icon.to_string(),
            urgency,
            timeout: NOTIFICATION_TIMEOUT,
            action: Some(NotificationAction {
                id: OPEN_CENTER_ACTION.to_string(),
                label: "Open Software Center".to_string(),
            }),
        }
    }

    pub fn security() -> Self {
        Self::new(
            "Security updates available",
            "Update at your earliest convenience to ensure continued security of your device",
            "software-update-urgent-symbolic",
            Urgency::High,
        )
    }

    pub fn regular() -> Self {
        Self::new(
            "Software updates available",
            "New software updates are available for your device",
            "software-update-available-symbolic",
            Urgency::Low,
        )
    }
}

/// What a single cycle ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No network; nothing was checked
    Offline,
    /// The backend failed; nothing to report this time
    Aborted,
    UpToDate,
    Notified { security: usize, total: usize },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Offline => write!(f, "offline, check skipped"),
            CycleOutcome::Aborted => write!(f, "aborted"),
            CycleOutcome::UpToDate => write!(f, "system is up to date"),
            CycleOutcome::Notified { security, total } => {
                write!(f, "{} updates available ({} security)", total, security)
            }
        }
    }
}

pub struct UpdateChecker<B, C, N> {
    backend: B,
    connectivity: C,
    notifier: N,
}

impl<B: UpdateBackend, C: Connectivity, N: Notifier> UpdateChecker<B, C, N> {
    pub fn new(backend: B, connectivity: C, notifier: N) -> Self {
        Self {
            backend,
            connectivity,
            notifier,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one complete update check
    pub fn run_cycle(&self) -> CycleOutcome {
        if !self.connectivity.network_available() {
            log::debug!("Network unavailable, skipping update check");
            return CycleOutcome::Offline;
        }

        if let Err(e) = self.backend.refresh_repositories() {
            log::warn!("Repository refresh failed: {:#}", e);
            return CycleOutcome::Aborted;
        }

        let upgradable = match self.backend.list_upgradable() {
            Ok(names) => names,
            Err(e) => {
                log::warn!("Listing upgradable packages failed: {:#}", e);
                return CycleOutcome::Aborted;
            }
        };
        if upgradable.is_empty() {
            log::info!("No updates available");
            return CycleOutcome::UpToDate;
        }

        let security = upgradable
            .iter()
            .filter_map(|name| match self.classify(name) {
                Ok(candidate) => candidate,
                Err(e) => {
                    log::warn!("Could not classify {}: {:#}", name, e);
                    None
                }
            })
            .filter(UpdateCandidate::is_security_update)
            .count();

        let notification = if security > 0 {
            Notification::security()
        } else {
            Notification::regular()
        };
        if let Err(e) = self.notifier.notify(&notification) {
            log::warn!("Failed to show notification: {:#}", e);
        }

        let outcome = CycleOutcome::Notified {
            security,
            total: upgradable.len(),
        };
        log::info!("Update check: {}", outcome);
        outcome
    }

    /// `None` when the package is no longer offered (obsolete)
    fn classify(&self, name: &str) -> Result<Option<UpdateCandidate>> {
        let Some(candidate) = self.backend.available_package(name)? else {
            log::debug!("{} is obsolete, skipping", name);
            return Ok(None);
        };
        let installed = self.backend.installed_package(name)?;
        let update = UpdateCandidate::from_packages(installed.as_ref(), candidate);
        log::debug!(
            "{}: {} newer releases, security: {}",
            name,
            update.history_slice().len(),
            update.is_security_update()
        );
        Ok(Some(update))
    }
}

impl UpdateBackend for LocalProvider {
    /// Re-imports every active repository that points at a local index file
    fn refresh_repositories(&self) -> Result<()> {
        for repo in self.db.list_repositories()? {
            if !repo.active {
                continue;
            }
            let Some(path) = local_index_path(&repo.url) else {
                log::warn!("Skipping refresh of {}: remote URL {}", repo.name, repo.url);
                continue;
            };
            let index = RepositoryIndex::load(&path)
                .with_context(|| format!("Failed to refresh repository {}", repo.name))?;
            let count = self.db.import_repository_index(&repo.name, &index)?;
            log::info!("Refreshed {} ({} packages)", repo.name, count);
        }
        self.db.flush()
    }

    fn list_upgradable(&self) -> Result<Vec<String>> {
        self.db.list_upgradable()
    }

    fn installed_package(&self, name: &str) -> Result<Option<PackageMeta>> {
        self.db.get_installed(name)
    }

    fn available_package(&self, name: &str) -> Result<Option<PackageMeta>> {
        self.db.get_available(name)
    }
}

impl<T: UpdateBackend + ?Sized> UpdateBackend for std::sync::Arc<T> {
    fn refresh_repositories(&self) -> Result<()> {
        (**self).refresh_repositories()
    }

    fn list_upgradable(&self) -> Result<Vec<String>> {
        (**self).list_upgradable()
    }

    fn installed_package(&self, name: &str) -> Result<Option<PackageMeta>> {
        (**self).installed_package(name)
    }

    fn available_package(&self, name: &str) -> Result<Option<PackageMeta>> {
        (**self).available_package(name)
    }
}
