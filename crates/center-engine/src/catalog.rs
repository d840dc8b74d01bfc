//! In-memory catalog of displayed packages

use center_core::{PackageRecord, PopulationFilter, Sink};
use std::collections::{BTreeMap, HashMap};

/// Records currently on display, one bucket per population filter
///
/// Buckets are keyed by package id. A new population cycle clears the bucket
/// it targets before items arrive; within a cycle a later record with the same
/// id replaces the earlier one, so several providers may feed one bucket.
#[derive(Debug, Default)]
pub struct Catalog {
    buckets: HashMap<PopulationFilter, BTreeMap<String, PackageRecord>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new population cycle for `filter`, dropping what it held
    pub fn begin_cycle(&mut self, filter: PopulationFilter) {
        if let Some(bucket) = self.buckets.get_mut(&filter) {
            log::debug!("Clearing {} {} records", bucket.len(), filter);
            bucket.clear();
        }
    }

    pub fn get(&self, filter: PopulationFilter, id: &str) -> Option<&PackageRecord> {
        self.buckets.get(&filter).and_then(|b| b.get(id))
    }

    /// Records of one bucket in id order
    pub fn records(&self, filter: PopulationFilter) -> Vec<&PackageRecord> {
        self.buckets
            .get(&filter)
            .map(|b| b.values().collect())
            .unwrap_or_default()
    }

    pub fn ids(&self, filter: PopulationFilter) -> Vec<&str> {
        self.buckets
            .get(&filter)
            .map(|b| b.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self, filter: PopulationFilter) -> usize {
        self.buckets.get(&filter).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, filter: PopulationFilter) -> bool {
        self.len(filter) == 0
    }
}

impl Sink for Catalog {
    fn add_item(&mut self, id: &str, record: PackageRecord, filter: PopulationFilter) {
        self.buckets
            .entry(filter)
            .or_default()
            .insert(id.to_string(), record);
    }
}
