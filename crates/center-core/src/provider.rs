//! Backend abstraction: providers populate sinks and plan transactions

use std::fmt;

use crate::cancel::CancelToken;
use crate::category::Group;
use crate::error::Result;
use crate::package::PackageRecord;
use crate::source::RepositorySource;
use crate::transaction::Transaction;

/// Which subset of packages a population run enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PopulationFilter {
    Installed,
    /// Recently updated packages
    Recent,
    /// Recently uploaded packages
    New,
    /// Free-text search
    Search,
}

impl fmt::Display for PopulationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationFilter::Installed => write!(f, "installed"),
            PopulationFilter::Recent => write!(f, "recent"),
            PopulationFilter::New => write!(f, "new"),
            PopulationFilter::Search => write!(f, "search"),
        }
    }
}

/// Receiver of records produced by [`Provider::populate`]
pub trait Sink {
    fn add_item(&mut self, id: &str, record: PackageRecord, filter: PopulationFilter);
}

/// Outcome of a single population run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateStats {
    /// Records handed to the sink
    pub added: usize,
    /// Items dropped because the backend failed on them
    pub skipped: usize,
    /// The run stopped early because its token was cancelled
    pub cancelled: bool,
}

impl fmt::Display for PopulateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} added, {} skipped", self.added, self.skipped)?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// One package-manager backend
///
/// Implementations are shared between the interactive context and worker
/// threads, so they must be `Send + Sync`. Planning never mutates the system.
pub trait Provider: Send + Sync {
    /// Identifier records carry as their origin
    fn id(&self) -> &str;

    /// Category tree, built once when the provider is constructed
    fn categories(&self) -> &[Group];

    /// Configured repositories, active or not, in backend order
    fn sources(&self) -> Result<Vec<RepositorySource>>;

    /// Enumerates packages matching `filter` into `sink`
    ///
    /// `query` is the free-text search for [`PopulationFilter::Search`].
    /// Implementations poll `cancel` between items and stop at once when it
    /// is set, without emitting further items.
    fn populate(
        &self,
        sink: &mut dyn Sink,
        filter: PopulationFilter,
        query: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<PopulateStats>;

    fn plan_install(&self, item: &PackageRecord) -> Result<Transaction>;

    fn plan_remove(&self, item: &PackageRecord) -> Result<Transaction>;

    fn plan_upgrade(&self, item: &PackageRecord) -> Result<Transaction>;
}
