//! Repository descriptions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured package repository, active or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositorySource {
    pub name: String,
    pub url: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl RepositorySource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, active: bool) -> Self {
        Self { name: name.into(), url: url.into(), active }
    }

    /// One-line description, e.g. "Solus - https://... (inactive)"
    pub fn describe(&self) -> String {
        let mut ret = format!("{} - {}", self.name, self.url);
        if !self.active {
            ret.push_str(" (inactive)");
        }
        ret
    }
}

impl fmt::Display for RepositorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
