//! Center DB - Local package database
//!
//! This crate manages a local Sled database standing in for the package
//! manager's own databases: installed packages, packages available from the
//! repositories, the group/component category tree and the repository list.
//! It is filled from JSON snapshots and repository index files.

mod database;
mod snapshot;
mod storage;

pub use database::{local_index_path, PackageDb};
pub use snapshot::{ComponentEntry, GroupEntry, ImportStats, RepositoryIndex, Snapshot};

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use center_core::PackageMeta;
    use tempfile::TempDir;

    #[test]
    fn test_insert_and_get() -> Result<()> {
        let tmp = TempDir::new()?;
        let db = PackageDb::open(tmp.path())?;

        let meta = PackageMeta::new("nano");
        db.insert_available(&meta)?;

        assert_eq!(db.get_available("nano")?, Some(meta));
        assert_eq!(db.get_installed("nano")?, None);
        Ok(())
    }

    #[test]
    fn test_local_index_path() {
        assert_eq!(
            local_index_path("file:///srv/repo/index.json"),
            Some("/srv/repo/index.json".into())
        );
        assert_eq!(local_index_path("/srv/repo/index.json"), Some("/srv/repo/index.json".into()));
        assert_eq!(local_index_path("https://mirrors.example/index.json"), None);
    }
}
