//! Output formatting structures for CLI display

use center_core::{ItemStatus, PackageRecord};
use tabled::Tabled;

/// Table row for displaying packages
#[derive(Tabled)]
pub struct PackageRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Release")]
    pub release: String,
    #[tabled(rename = "Summary")]
    pub summary: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl PackageRow {
    pub fn from_record(record: &PackageRecord) -> Self {
        let meta = record.display();

        let mut status = Vec::new();
        if record.is_installed() {
            status.push("installed".to_string());
        }
        if record.has_update() {
            status.push("update available".to_string());
        }
        if record.has_status(ItemStatus::Devel) {
            status.push(ItemStatus::Devel.to_string());
        }

        Self {
            name: record.id().to_string(),
            version: meta.version().unwrap_or("-").to_string(),
            release: meta.release().map_or_else(|| "-".to_string(), |r| r.to_string()),
            summary: meta.summary.clone(),
            status: status.join(", "),
        }
    }
}

/// Table row for displaying repositories
#[derive(Tabled)]
pub struct SourceRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

/// Table row for displaying history entries
#[derive(Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "Release")]
    pub release: u32,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Type")]
    pub update_type: String,
    #[tabled(rename = "Date")]
    pub date: String,
}
