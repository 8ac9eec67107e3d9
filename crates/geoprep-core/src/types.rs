//! Run summaries returned by the document operations.

use std::fmt;

/// Result of annotating a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotateStats {
    /// Number of features that received an id and a color
    pub features: usize,
    /// Id assigned to the last feature, if any
    pub last_id: Option<u64>,
}

/// Result of simplifying a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimplifyStats {
    /// Number of features visited (zero for a bare geometry)
    pub features: usize,
    /// Number of geometries simplified
    pub geometries: usize,
    /// Total coordinates before simplification
    pub vertices_before: usize,
    /// Total coordinates after simplification
    pub vertices_after: usize,
}

impl SimplifyStats {
    /// Coordinates dropped by simplification.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.vertices_before.saturating_sub(self.vertices_after)
    }
}

impl fmt::Display for SimplifyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} geometries in {} features, {} -> {} vertices",
            self.geometries, self.features, self.vertices_before, self.vertices_after
        )
    }
}

/// Result of reprojecting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReprojectStats {
    /// Number of features visited (zero for a bare geometry)
    pub features: usize,
    /// Number of geometries transformed
    pub geometries: usize,
    /// Number of coordinates transformed
    pub coordinates: usize,
}
