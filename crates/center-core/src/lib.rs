//! Center Core - Shared data models and the provider contract
//!
//! This crate defines the data structures used throughout the project:
//! package records pairing installed and available metadata, the category
//! tree, repository sources, transactions and update classification, plus the
//! `Provider` / `Sink` traits every backend implements.

mod cancel;
mod category;
mod error;
mod package;
mod provider;
mod source;
mod transaction;
mod update;

pub use cancel::CancelToken;
pub use category::{Component, Group, COMPONENT_ICON};
pub use error::{CoreError, Result};
pub use package::{Dependency, HistoryEntry, ItemStatus, PackageMeta, PackageRecord};
pub use provider::{PopulateStats, PopulationFilter, Provider, Sink};
pub use source::RepositorySource;
pub use transaction::{OperationKind, SetKind, Transaction};
pub use update::{history_between, UpdateCandidate};

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, release: u32) -> PackageMeta {
        let mut m = PackageMeta::new(name);
        m.history.push(HistoryEntry::new(release, "1.0", "bug"));
        m
    }

    #[test]
    fn test_display_prefers_installed() {
        let record = PackageRecord::new("local", Some(meta("nano", 3)), Some(meta("nano", 4))).unwrap();
        assert_eq!(record.display().release(), Some(3));
        assert!(record.has_update());
    }

    #[test]
    fn test_record_requires_a_view() {
        assert!(PackageRecord::new("local", None, None).is_err());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(token.same_as(&clone));
        assert!(!token.same_as(&CancelToken::new()));
    }

    #[test]
    fn test_operation_kind_parsing() {
        assert_eq!("remove".parse::<OperationKind>(), Ok(OperationKind::Remove));
        assert!("frobnicate".parse::<OperationKind>().is_err());
    }
}
