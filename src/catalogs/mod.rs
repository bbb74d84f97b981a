//! Body catalogs module
//!
//! A catalog is the fixed, ordered list of small bodies a run produces kernels
//! for. It is an explicit value handed to the planner so callers (and tests)
//! can swap in a different list.

pub mod comets;

pub use comets::default_comets;

/// A single body to query from Horizons
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BodySpec {
    /// Human-readable name, e.g. "1P/Halley"
    pub label: String,
    /// Designation passed to Horizons, e.g. "1P" or "C/1995 O1"
    pub designation: String,
}

impl BodySpec {
    /// Create a new body spec
    pub fn new(label: impl Into<String>, designation: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            designation: designation.into(),
        }
    }
}

/// Immutable, ordered list of bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyCatalog {
    bodies: Vec<BodySpec>,
}

impl BodyCatalog {
    /// Build a catalog from bodies in the order they should be written
    pub fn new(bodies: Vec<BodySpec>) -> Self {
        Self { bodies }
    }

    /// Bodies in catalog order
    pub fn bodies(&self) -> &[BodySpec] {
        &self.bodies
    }

    /// Number of bodies in the catalog
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Find a body by its designation
    pub fn find(&self, designation: &str) -> Option<&BodySpec> {
        self.bodies.iter().find(|b| b.designation == designation)
    }
}

impl Default for BodyCatalog {
    fn default() -> Self {
        default_comets()
    }
}

impl FromIterator<BodySpec> for BodyCatalog {
    fn from_iter<I: IntoIterator<Item = BodySpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
