//! Tolerances and limits for the merge pass.

use crate::{MAX_POINTS_ON_WINDING, ON_EPSILON};

/// Collinearity tolerance when deciding whether a junction vertex survives a merge.
pub const CONTINUOUS_EPSILON: f64 = 0.000_5;

/// Faces whose combined point count exceeds this are never merged.
pub const MAX_EDGES: usize = 64;

/// Settings for [`FaceMerger`](crate::FaceMerger).
///
/// ```
/// use bsp_merge::MergeConfig;
///
/// let config = MergeConfig::default().with_max_edges(32);
/// assert_eq!(config.max_edges, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeConfig {
    /// Per-coordinate tolerance when matching the points of a shared edge.
    pub equal_epsilon: f64,
    /// Tolerance of the convexity and collinearity tests at junction vertices.
    pub continuous_epsilon: f64,
    /// Upper bound on the combined point count of two faces being merged.
    /// Values above [`MAX_POINTS_ON_WINDING`] are clamped.
    pub max_edges: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            equal_epsilon: ON_EPSILON,
            continuous_epsilon: CONTINUOUS_EPSILON,
            max_edges: MAX_EDGES,
        }
    }
}

impl MergeConfig {
    /// Sets the shared-edge matching tolerance.
    pub fn with_equal_epsilon(mut self, epsilon: f64) -> Self {
        self.equal_epsilon = epsilon;
        self
    }

    /// Sets the convexity tolerance.
    pub fn with_continuous_epsilon(mut self, epsilon: f64) -> Self {
        self.continuous_epsilon = epsilon;
        self
    }

    /// Sets the edge limit.
    pub fn with_max_edges(mut self, max_edges: usize) -> Self {
        self.max_edges = max_edges;
        self
    }

    /// The edge limit actually enforced.
    #[inline]
    pub fn edge_limit(&self) -> usize {
        self.max_edges.min(MAX_POINTS_ON_WINDING)
    }
}
