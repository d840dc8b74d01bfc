//! Two-level category tree: groups owning components

use serde::{Deserialize, Serialize};

/// Icon shown for every component
pub const COMPONENT_ICON: &str = "package-x-generic";

/// Leaf of the category tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Component {
    pub id: String,
    /// Localized display name
    pub name: String,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }

    pub fn icon_name(&self) -> &str {
        COMPONENT_ICON
    }
}

/// Top level category owning an ordered list of components
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    /// Localized display name
    pub name: String,
    pub icon: String,
    /// Children, sorted by id
    pub components: Vec<Component>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            components: Vec::new(),
        }
    }

    pub fn icon_name(&self) -> &str {
        &self.icon
    }
}
