//! Error types for the winding kernel and the merge pass.

use nalgebra::Vector3;
use thiserror::Error;

use crate::PlaneId;

/// Structural geometry failures.
///
/// These indicate a bug upstream of the kernel (a broken CSG result, a corrupt
/// plane table) and abort the compile. Recoverable decisions such as "these two
/// faces cannot be merged" are never reported through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Clip or divide was called on a winding with fewer than three points.
    #[error("degenerate winding with {points} points")]
    DegenerateWinding {
        /// Number of points the winding had.
        points: usize,
    },

    /// The plane normal has no dominant axis to build a base winding from.
    #[error("no axis found for winding (normal {normal:?})")]
    NoWindingAxis {
        /// The offending normal.
        normal: Vector3<f64>,
    },

    /// A winding grew past `MAX_POINTS_ON_WINDING`.
    #[error("winding has {points} points, more than the maximum of {max}")]
    TooManyPoints {
        /// Number of points requested.
        points: usize,
        /// The hard capacity.
        max: usize,
    },

    /// Clipping produced more points than the input count plus slack.
    #[error("clipped winding has {points} points, expected at most {max}")]
    PointOverflow {
        /// Number of points produced.
        points: usize,
        /// Input count plus slack.
        max: usize,
    },

    /// A face references a plane missing from the plane table.
    #[error("plane {0} is not in the plane table")]
    UnknownPlane(PlaneId),

    /// `Winding::check` found a malformed winding.
    #[error("invalid winding: {0}")]
    InvalidWinding(String),
}

/// Fatal errors from the tree-wide merge pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Merging the face list of a node failed.
    #[error("merging faces of node {node} failed: {source}")]
    Node {
        /// Pre-order index of the node.
        node: usize,
        /// Underlying geometry error.
        #[source]
        source: GeometryError,
    },

    /// Subdividing one merged face of a node failed.
    #[error("subdividing face {face} of node {node} failed: {source}")]
    Face {
        /// Pre-order index of the node.
        node: usize,
        /// Index of the face in the merged list of that node.
        face: usize,
        /// Underlying geometry error.
        #[source]
        source: GeometryError,
    },

    /// A face failed the winding check run over a tree.
    #[error("face {face} of node {node} is invalid: {source}")]
    InvalidFace {
        /// Pre-order index of the node.
        node: usize,
        /// Index of the face in the node's list.
        face: usize,
        /// The failed check.
        #[source]
        source: GeometryError,
    },
}

/// Result alias used throughout the kernel.
pub type Result<T, E = GeometryError> = std::result::Result<T, E>;
