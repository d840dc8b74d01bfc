//! Planning surfaces: the Idle → Planning → Ready/Failed state machine

use center_core::{CoreError, OperationKind, PackageRecord, Provider, Transaction};

/// Why a planning request ended in `Failed`
#[derive(Debug, thiserror::Error)]
pub enum PlanFailure {
    /// Programmer error: the operation has no per-package plan
    #[error("unsupported operation: {0}")]
    Unsupported(OperationKind),

    #[error("no provider registered as {0:?}")]
    ProviderMissing(String),

    #[error(transparent)]
    Provider(#[from] CoreError),
}

impl PlanFailure {
    /// True for failures that indicate a bug rather than a user situation
    pub fn is_programmer_error(&self) -> bool {
        matches!(self, PlanFailure::Unsupported(_) | PlanFailure::ProviderMissing(_))
    }
}

/// State of one planning surface
#[derive(Debug, Default)]
pub enum PlanState {
    #[default]
    Idle,
    Planning {
        item: String,
        operation: OperationKind,
    },
    Ready(Transaction),
    Failed(PlanFailure),
}

impl PlanState {
    pub fn is_planning(&self) -> bool {
        matches!(self, PlanState::Planning { .. })
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            PlanState::Ready(tx) => Some(tx),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&PlanFailure> {
        match self {
            PlanState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Answer to a planning request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRequest {
    Accepted,
    /// The surface is still planning; nothing changed
    Rejected,
}

/// Runs the provider's planner for `operation` (on a worker thread)
pub(crate) fn execute_plan(
    provider: &dyn Provider,
    item: &PackageRecord,
    operation: OperationKind,
) -> Result<Transaction, PlanFailure> {
    let tx = match operation {
        OperationKind::Install => provider.plan_install(item)?,
        OperationKind::Remove => provider.plan_remove(item)?,
        OperationKind::Upgrade => provider.plan_upgrade(item)?,
        OperationKind::SystemUpgrade => return Err(PlanFailure::Unsupported(operation)),
    };
    Ok(tx)
}
