//! Design catalog
//!
//! Static, ordered list of selectable designs. Each design id selects a
//! configurator instance and names the 3D model its render session loads.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// One selectable design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    /// Catalog key, used in routes
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Viewer model identifier loaded for this design
    pub model_id: String,
}

impl Design {
    /// Create a design record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            model_id: model_id.into(),
        }
    }

    /// Route path of the configurator for this design
    pub fn route(&self) -> String {
        format!("/configurator/{}", self.id)
    }
}

/// Ordered collection of designs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignCatalog {
    designs: Vec<Design>,
}

impl DesignCatalog {
    /// Create a catalog from designs, preserving order
    pub fn new(designs: Vec<Design>) -> Self {
        Self { designs }
    }

    /// Built-in catalog shipped with the configurator
    pub fn builtin() -> Self {
        Self::new(vec![
            Design::new("small-cube", "Small Cube", "A simple cube.", "small-cube"),
            Design::new(
                "small-table",
                "Small Table",
                "A customizable table.",
                "5f94fb035fa74f43abda3ada8f0a719e",
            ),
        ])
    }

    /// Look up a design by id
    pub fn find(&self, id: &str) -> Result<&Design, ConfigurationError> {
        self.designs
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ConfigurationError::UnknownDesign { id: id.to_string() })
    }

    /// Designs in catalog order
    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    /// Number of designs
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// First id that appears more than once, if any
    pub fn duplicate_id(&self) -> Option<&str> {
        self.designs.iter().enumerate().find_map(|(i, d)| {
            self.designs[..i]
                .iter()
                .any(|earlier| earlier.id == d.id)
                .then_some(d.id.as_str())
        })
    }
}

impl Default for DesignCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
