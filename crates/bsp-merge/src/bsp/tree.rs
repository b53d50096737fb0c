//! BSP tree container.

use log::debug;

use crate::error::MergeError;
use crate::{Face, MergeConfig, PlaneTable, Subdivider};

use super::merge_pass::{merge_tree, merge_tree_serial, MergeStats};
use super::node::BspNode;
use super::visitor::{FaceListVisitor, FaceStats, WindingValidator};

/// A Binary Space Partitioning tree whose nodes carry face lists.
///
/// The topology comes from the map compiler and is fixed by the time faces
/// are merged; this type only walks it and rewrites face lists.
///
/// # Merging
///
/// ```
/// use bsp_merge::bsp::{BspNode, BspTree};
/// use bsp_merge::{
///     Contents, Face, MergeConfig, NoSubdivision, Plane3D, PlaneTable, SurfaceAttributes,
///     TexInfoId, Winding,
/// };
/// use nalgebra::{Point3, Vector3};
///
/// let mut planes = PlaneTable::new();
/// let floor = planes.insert(Plane3D::new(Vector3::z(), 0.0));
/// let surface = SurfaceAttributes::new(TexInfoId(0), Contents(-1));
/// let square = |x: f64| {
///     let winding = Winding::from_points(vec![
///         Point3::new(x, 0.0, 0.0),
///         Point3::new(x + 1.0, 0.0, 0.0),
///         Point3::new(x + 1.0, 1.0, 0.0),
///         Point3::new(x, 1.0, 0.0),
///     ])
///     .unwrap();
///     Face::new(winding, floor, surface)
/// };
///
/// let root = BspNode::leaf(Contents(-1)).with_faces(vec![square(0.0), square(1.0)]);
/// let mut tree = BspTree::from_root(root);
/// let stats = tree
///     .merge_all(&planes, &NoSubdivision, MergeConfig::default())
///     .unwrap();
///
/// assert_eq!((stats.premerge, stats.merged), (2, 1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTree {
    root: Option<BspNode>,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Wraps an already built node hierarchy.
    pub fn from_root(root: BspNode) -> Self {
        Self { root: Some(root) }
    }

    /// Returns `true` if the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode> {
        self.root.as_ref()
    }

    /// Returns a mutable reference to the root node, if any.
    #[inline]
    pub fn root_mut(&mut self) -> Option<&mut BspNode> {
        self.root.as_mut()
    }

    /// Returns the total number of faces in the tree.
    pub fn face_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.face_count())
    }

    /// Returns the total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Walks the tree in pre-order (node, front, back), handing every
    /// node's index and face list to the visitor. Stops at the first error.
    pub fn walk<V>(&self, visitor: &mut V) -> Result<(), MergeError>
    where
        V: FaceListVisitor + ?Sized,
    {
        match self.root {
            Some(ref root) => walk_node(root, &mut 0, visitor),
            None => Ok(()),
        }
    }

    /// Face, point and area totals over every node.
    pub fn face_stats(&self) -> FaceStats {
        let mut stats = FaceStats::default();
        // counting never fails
        let _ = self.walk(&mut stats);
        stats
    }

    /// Checks every face's winding against its facing plane, returning the
    /// number of faces checked.
    pub fn check_faces(&self, planes: &PlaneTable) -> Result<usize, MergeError> {
        let mut validator = WindingValidator::new(planes);
        self.walk(&mut validator)?;
        Ok(validator.checked())
    }

    /// Collects all faces in the tree into a vector, in pre-order.
    pub fn collect_faces(&self) -> Vec<Face> {
        let mut result = Vec::with_capacity(self.face_count());
        collect_faces_recursive(self.root.as_ref(), &mut result);
        result
    }

    /// Merges the face list of every node, split and leaf alike, then passes
    /// each merged face through `subdivider`.
    ///
    /// Nodes are processed in parallel on the rayon pool. The first geometry
    /// error aborts the pass; face lists of nodes that were already done keep
    /// their merged faces.
    pub fn merge_all<S>(
        &mut self,
        planes: &PlaneTable,
        subdivider: &S,
        config: MergeConfig,
    ) -> Result<MergeStats, MergeError>
    where
        S: Subdivider + ?Sized,
    {
        let stats = match self.root.as_mut() {
            Some(root) => merge_tree(root, planes, subdivider, config)?,
            None => MergeStats::default(),
        };
        debug!("{}", self.face_stats());
        Ok(stats)
    }

    /// Same as [`merge_all`](Self::merge_all) on the calling thread only.
    pub fn merge_all_serial<S>(
        &mut self,
        planes: &PlaneTable,
        subdivider: &S,
        config: MergeConfig,
    ) -> Result<MergeStats, MergeError>
    where
        S: Subdivider + ?Sized,
    {
        match self.root.as_mut() {
            Some(root) => merge_tree_serial(root, planes, subdivider, config),
            None => Ok(MergeStats::default()),
        }
    }
}

/// Visits a node subtree in pre-order, numbering nodes from `index`.
fn walk_node<V>(node: &BspNode, index: &mut usize, visitor: &mut V) -> Result<(), MergeError>
where
    V: FaceListVisitor + ?Sized,
{
    let current = *index;
    *index += 1;
    visitor.visit(current, node.faces())?;
    if let Some([front, back]) = node.children() {
        walk_node(front, index, visitor)?;
        walk_node(back, index, visitor)?;
    }
    Ok(())
}

/// Recursively collects all faces from a node subtree.
fn collect_faces_recursive(node: Option<&BspNode>, result: &mut Vec<Face>) {
    if let Some(n) = node {
        result.extend(n.faces().iter().cloned());
        collect_faces_recursive(n.front(), result);
        collect_faces_recursive(n.back(), result);
    }
}
