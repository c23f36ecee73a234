//! Search index catalog types

use serde::{Deserialize, Serialize};

/// A search index exposed to clients
///
/// Immutable once listed; fetched on demand from the search backend's
/// catalog and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name, the value clients pass back in chat requests
    pub name: String,
    /// Human-readable label for pickers
    pub display_label: String,
}

impl IndexDescriptor {
    /// Create a descriptor whose label defaults to the name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_label: name.clone(),
            name,
        }
    }

    /// Create a descriptor with an explicit label
    pub fn with_label(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_label: label.into(),
        }
    }
}
