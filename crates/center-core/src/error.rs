//! Error types for center-core

use crate::transaction::OperationKind;

/// Errors specific to center-core and the provider contract
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid package record: {0}")]
    InvalidRecord(String),

    #[error("Cannot {operation} {id}: {reason}")]
    InvalidOperation {
        id: String,
        operation: OperationKind,
        reason: String,
    },

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Package {id} is already scheduled for {existing}")]
    ConflictingTransaction { id: String, existing: &'static str },

    #[error("{package} cannot be satisfied alongside {conflict} in the same transaction")]
    DependencyConflict { package: String, conflict: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Result alias used by the provider contract
pub type Result<T> = std::result::Result<T, CoreError>;
