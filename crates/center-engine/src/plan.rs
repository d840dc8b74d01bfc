//! Transaction planning: dependency and conflict closure
//!
//! Planning only reads the databases. It computes what the external
//! transaction executor would have to install, remove and upgrade.

use center_core::{
    CoreError, OperationKind, PackageMeta, PackageRecord, Result, SetKind, Transaction,
};
use std::collections::VecDeque;

use crate::provider::LocalProvider;

fn invalid(item: &PackageRecord, operation: OperationKind, reason: &str) -> CoreError {
    CoreError::InvalidOperation {
        id: item.id().to_string(),
        operation,
        reason: reason.to_string(),
    }
}

/// Walks dependencies and conflicts of everything entering the system
struct Closure<'a> {
    provider: &'a LocalProvider,
    tx: Transaction,
    /// Packages entering the system whose dependencies are not walked yet
    queue: VecDeque<PackageMeta>,
}

impl<'a> Closure<'a> {
    fn new(provider: &'a LocalProvider) -> Self {
        Self {
            provider,
            tx: Transaction::new(),
            queue: VecDeque::new(),
        }
    }

    fn record(&self, installed: Option<PackageMeta>, available: Option<PackageMeta>) -> Result<PackageRecord> {
        PackageRecord::new(&self.provider.config.id, installed, available)
    }

    /// Schedules a package entering the system (install or upgrade)
    fn enter(&mut self, kind: SetKind, installed: Option<PackageMeta>, available: PackageMeta) -> Result<()> {
        let record = self.record(installed, Some(available.clone()))?;
        if self.tx.add(kind, record)? {
            self.queue.push_back(available);
        }
        Ok(())
    }

    fn remove(&mut self, installed: PackageMeta) -> Result<()> {
        let available = self.provider.db.get_available(&installed.name)?;
        let record = self.record(Some(installed), available)?;
        self.tx.add(SetKind::Removals, record)?;
        Ok(())
    }

    /// Removes `installed` and everything that (transitively) depends on it
    ///
    /// Dependents already scheduled for an upgrade are left alone; their new
    /// dependencies are checked by `check_dependencies`.
    fn remove_with_dependents(&mut self, installed: PackageMeta) -> Result<()> {
        let provider = self.provider;
        let db = &provider.db;
        let mut queue = VecDeque::from([installed.name.clone()]);
        self.remove(installed)?;

        while let Some(name) = queue.pop_front() {
            for rdep in db.reverse_dependencies(&name)? {
                if self.tx.contains(&rdep) {
                    continue;
                }
                if let Some(installed) = db.get_installed(&rdep)? {
                    log::debug!("{} depends on {}, removing", rdep, name);
                    self.remove(installed)?;
                    queue.push_back(rdep);
                }
            }
        }
        Ok(())
    }

    /// Fails when something entering the system needs a package being removed
    fn check_dependencies(&self) -> Result<()> {
        let entering = self
            .tx
            .installations()
            .chain(self.tx.upgrades())
            .filter_map(PackageRecord::available);
        for meta in entering {
            if let Some(dep) = meta
                .dependencies
                .iter()
                .find(|d| self.tx.set_of(&d.name) == Some(SetKind::Removals))
            {
                return Err(CoreError::DependencyConflict {
                    package: meta.name.clone(),
                    conflict: dep.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn resolve(mut self) -> Result<Transaction> {
        let provider = self.provider;
        let db = &provider.db;

        while let Some(meta) = self.queue.pop_front() {
            for dep in &meta.dependencies {
                match self.tx.set_of(&dep.name) {
                    Some(SetKind::Removals) => {
                        return Err(CoreError::DependencyConflict {
                            package: meta.name.clone(),
                            conflict: dep.name.clone(),
                        })
                    }
                    Some(_) => continue,
                    None => {}
                }
                match db.get_installed(&dep.name)? {
                    Some(installed) => {
                        let Some(min) = dep.release_from else { continue };
                        if installed.release().unwrap_or(0) >= min {
                            continue;
                        }
                        let available = db
                            .get_available(&dep.name)?
                            .filter(|a| a.release().unwrap_or(0) >= min)
                            .ok_or_else(|| {
                                CoreError::PackageNotFound(format!("{} (release {} or newer)", dep.name, min))
                            })?;
                        log::debug!("{} needs {} >= {}, upgrading", meta.name, dep.name, min);
                        self.enter(SetKind::Upgrades, Some(installed), available)?;
                    }
                    None => {
                        let available = db
                            .get_available(&dep.name)?
                            .ok_or_else(|| CoreError::PackageNotFound(dep.name.clone()))?;
                        log::debug!("{} pulls in {}", meta.name, dep.name);
                        self.enter(SetKind::Installations, None, available)?;
                    }
                }
            }

            for conflict in &meta.conflicts {
                match self.tx.set_of(conflict) {
                    Some(SetKind::Removals) => continue,
                    Some(_) => {
                        return Err(CoreError::DependencyConflict {
                            package: meta.name.clone(),
                            conflict: conflict.clone(),
                        })
                    }
                    None => {
                        if let Some(installed) = db.get_installed(conflict)? {
                            log::debug!("{} conflicts with installed {}", meta.name, conflict);
                            self.remove_with_dependents(installed)?;
                        }
                    }
                }
            }
        }

        self.remove_reverse_conflicts()?;
        self.check_dependencies()?;
        Ok(self.tx)
    }

    /// Installed packages that declare a conflict with something entering
    fn remove_reverse_conflicts(&mut self) -> Result<()> {
        let provider = self.provider;
        let db = &provider.db;
        for name in db.list_installed()? {
            if self.tx.contains(&name) {
                continue;
            }
            let Some(installed) = db.get_installed(&name)? else { continue };
            let clashes = installed.conflicts.iter().any(|c| {
                matches!(
                    self.tx.set_of(c),
                    Some(SetKind::Installations) | Some(SetKind::Upgrades)
                )
            });
            if clashes {
                log::debug!("Installed {} conflicts with the transaction", name);
                self.remove_with_dependents(installed)?;
            }
        }
        Ok(())
    }
}

impl LocalProvider {
    pub(crate) fn compute_install(&self, item: &PackageRecord) -> Result<Transaction> {
        if item.is_installed() || self.db.has_installed(item.id())? {
            return Err(invalid(item, OperationKind::Install, "already installed"));
        }
        let available = self
            .db
            .get_available(item.id())?
            .ok_or_else(|| invalid(item, OperationKind::Install, "not available from any repository"))?;

        let mut closure = Closure::new(self);
        closure.enter(SetKind::Installations, None, available)?;
        let tx = closure.resolve()?;
        log_plan(OperationKind::Install, item, &tx);
        Ok(tx)
    }

    pub(crate) fn compute_remove(&self, item: &PackageRecord) -> Result<Transaction> {
        let installed = self
            .db
            .get_installed(item.id())?
            .ok_or_else(|| invalid(item, OperationKind::Remove, "not installed"))?;

        let mut closure = Closure::new(self);
        closure.remove_with_dependents(installed)?;

        log_plan(OperationKind::Remove, item, &closure.tx);
        Ok(closure.tx)
    }

    pub(crate) fn compute_upgrade(&self, item: &PackageRecord) -> Result<Transaction> {
        let installed = self
            .db
            .get_installed(item.id())?
            .ok_or_else(|| invalid(item, OperationKind::Upgrade, "not installed"))?;
        let available = self
            .db
            .get_available(item.id())?
            .ok_or_else(|| invalid(item, OperationKind::Upgrade, "not available from any repository"))?;
        if available.release() <= installed.release() {
            return Err(invalid(item, OperationKind::Upgrade, "no newer release available"));
        }

        let mut closure = Closure::new(self);
        closure.enter(SetKind::Upgrades, Some(installed), available)?;
        let tx = closure.resolve()?;
        log_plan(OperationKind::Upgrade, item, &tx);
        Ok(tx)
    }
}

fn log_plan(operation: OperationKind, item: &PackageRecord, tx: &Transaction) {
    log::debug!(
        "Planned {} {}: {} to install, {} to remove, {} to upgrade",
        operation,
        item.id(),
        tx.len(SetKind::Installations),
        tx.len(SetKind::Removals),
        tx.len(SetKind::Upgrades)
    );
}
