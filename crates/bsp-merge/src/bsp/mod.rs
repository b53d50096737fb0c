//! Binary Space Partitioning tree carrying face lists, and the tree-wide
//! merge pass.
//!
//! The tree is produced elsewhere by the map compiler; every node, split or
//! leaf, owns a list of faces. After CSG and splitting those lists are full of
//! small coplanar fragments, which [`BspTree::merge_all`] joins back together
//! and then re-subdivides.
//!
//! # Example
//!
//! ```ignore
//! use bsp_merge::bsp::BspTree;
//! use bsp_merge::{AxialSubdivider, MergeConfig};
//!
//! let mut tree: BspTree = /* built by the compiler */;
//! let stats = tree.merge_all(&planes, &AxialSubdivider::default(), MergeConfig::default())?;
//! log::info!("{stats}");
//!
//! // Every merged winding must still be convex and on its plane
//! tree.check_faces(&planes)?;
//! log::info!("{}", tree.face_stats());
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: The main container holding the root node
//! - [`BspNode`]: Split and leaf nodes, each with its own face list
//! - [`MergeStats`]: Face counts reported by a merge pass
//! - [`FaceListVisitor`]: Read-only passes such as [`FaceStats`] and [`WindingValidator`]

mod merge_pass;
mod node;
mod tree;
mod visitor;

// Re-export main types
pub use merge_pass::MergeStats;
pub use node::{BspNode, NodeKind};
pub use tree::BspTree;
pub use visitor::{FaceListVisitor, FaceStats, WindingValidator};
