//! BSP tree node implementation.

use crate::{Contents, Face, PlaneId};

/// What a node is besides its faces.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// An internal node: a splitting plane and exactly two children,
    /// front first.
    Split {
        plane: PlaneId,
        children: Box<[BspNode; 2]>,
    },
    /// A leaf: a convex region of uniform contents.
    Leaf { contents: Contents },
}

/// A node in the BSP tree.
///
/// Split and leaf nodes both own a face list. Faces on a split node lie on
/// its splitting plane; faces on a leaf are whatever the map compiler stored
/// there. The merge pass only ever rewrites face lists, never the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    kind: NodeKind,
    faces: Vec<Face>,
}

impl BspNode {
    /// Creates a leaf with no faces.
    pub fn leaf(contents: Contents) -> Self {
        Self {
            kind: NodeKind::Leaf { contents },
            faces: Vec::new(),
        }
    }

    /// Creates a split node with no faces of its own.
    pub fn split(plane: PlaneId, front: BspNode, back: BspNode) -> Self {
        Self {
            kind: NodeKind::Split {
                plane,
                children: Box::new([front, back]),
            },
            faces: Vec::new(),
        }
    }

    /// Replaces the node's face list.
    pub fn with_faces(mut self, faces: Vec<Face>) -> Self {
        self.faces = faces;
        self
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the splitting plane, or `None` for a leaf.
    #[inline]
    pub fn plane(&self) -> Option<PlaneId> {
        match self.kind {
            NodeKind::Split { plane, .. } => Some(plane),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Returns the leaf contents, or `None` for a split node.
    #[inline]
    pub fn contents(&self) -> Option<Contents> {
        match self.kind {
            NodeKind::Leaf { contents } => Some(contents),
            NodeKind::Split { .. } => None,
        }
    }

    /// Faces owned by this node only.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn faces_mut(&mut self) -> &mut Vec<Face> {
        &mut self.faces
    }

    #[inline]
    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Returns the front child, or `None` for a leaf.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.children().map(|[front, _]| front)
    }

    /// Returns the back child, or `None` for a leaf.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.children().map(|[_, back]| back)
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut BspNode> {
        self.children_mut().map(|[front, _]| front)
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut BspNode> {
        self.children_mut().map(|[_, back]| back)
    }

    /// Both children, front first.
    pub fn children(&self) -> Option<&[BspNode; 2]> {
        match &self.kind {
            NodeKind::Split { children, .. } => Some(&**children),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut [BspNode; 2]> {
        match &mut self.kind {
            NodeKind::Split { children, .. } => Some(&mut **children),
            NodeKind::Leaf { .. } => None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Returns the total number of faces in this subtree (including all descendants).
    pub fn face_count(&self) -> usize {
        self.faces.len()
            + self
                .children()
                .map_or(0, |[front, back]| front.face_count() + back.face_count())
    }

    /// Returns the number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |[front, back]| front.node_count() + back.node_count())
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |[front, back]| front.depth().max(back.depth()))
    }
}

/// Appends a mutable handle to every face list of the subtree, in pre-order.
///
/// The handles borrow disjoint nodes, so they can be handed to separate
/// worker threads.
pub(crate) fn collect_face_lists<'a>(node: &'a mut BspNode, out: &mut Vec<&'a mut Vec<Face>>) {
    let BspNode { kind, faces } = node;
    out.push(faces);
    if let NodeKind::Split { children, .. } = kind {
        let [front, back] = &mut **children;
        collect_face_lists(front, out);
        collect_face_lists(back, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SurfaceAttributes, TexInfoId, Winding};
    use nalgebra::Point3;

    const SOLID: Contents = Contents(-2);
    const EMPTY: Contents = Contents(-1);

    fn make_triangle(plane: PlaneId, z: f64) -> Face {
        let winding = Winding::from_points(vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ])
        .unwrap();
        Face::new(winding, plane, SurfaceAttributes::new(TexInfoId(0), EMPTY))
    }

    #[test]
    fn new_leaf_is_empty() {
        let node = BspNode::leaf(SOLID);

        assert!(node.is_leaf());
        assert_eq!(node.contents(), Some(SOLID));
        assert_eq!(node.plane(), None);
        assert_eq!(node.front(), None);
        assert_eq!(node.face_count(), 0);
        assert_eq!(node.node_count(), 1);
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn split_owns_front_then_back() {
        let node = BspNode::split(PlaneId(4), BspNode::leaf(EMPTY), BspNode::leaf(SOLID));

        assert!(!node.is_leaf());
        assert_eq!(node.plane(), Some(PlaneId(4)));
        assert_eq!(node.contents(), None);
        assert_eq!(node.front().and_then(BspNode::contents), Some(EMPTY));
        assert_eq!(node.back().and_then(BspNode::contents), Some(SOLID));
    }

    #[test]
    fn depth_calculation() {
        let front = BspNode::split(PlaneId(1), BspNode::leaf(EMPTY), BspNode::leaf(SOLID));
        let root = BspNode::split(PlaneId(0), front, BspNode::leaf(SOLID));

        // root -> front -> leaf (depth 3)
        assert_eq!(root.depth(), 3);
        assert_eq!(root.node_count(), 5);
    }

    #[test]
    fn face_count_recursive() {
        let leaf = BspNode::leaf(EMPTY).with_faces(vec![make_triangle(PlaneId(0), 0.0)]);
        let mut root = BspNode::split(PlaneId(0), leaf, BspNode::leaf(SOLID)).with_faces(vec![
            make_triangle(PlaneId(0), 0.0),
            make_triangle(PlaneId(0), 0.0),
        ]);
        assert_eq!(root.face_count(), 3);

        if let Some(back) = root.back_mut() {
            back.add_face(make_triangle(PlaneId(0), 0.0));
        }
        assert_eq!(root.face_count(), 4);
        assert_eq!(root.faces().len(), 2);
    }

    #[test]
    fn face_lists_are_collected_in_pre_order() {
        let front = BspNode::split(
            PlaneId(1),
            BspNode::leaf(EMPTY).with_faces(vec![make_triangle(PlaneId(1), 2.0)]),
            BspNode::leaf(SOLID).with_faces(vec![make_triangle(PlaneId(1), 3.0)]),
        )
        .with_faces(vec![make_triangle(PlaneId(1), 1.0)]);
        let back = BspNode::leaf(SOLID).with_faces(vec![make_triangle(PlaneId(0), 4.0)]);
        let mut root =
            BspNode::split(PlaneId(0), front, back).with_faces(vec![make_triangle(PlaneId(0), 0.0)]);

        let mut lists = Vec::new();
        collect_face_lists(&mut root, &mut lists);

        let order: Vec<f64> = lists.iter().map(|l| l[0].winding().points()[0].z).collect();
        assert_eq!(order, vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        lists[2].clear();
        assert_eq!(root.face_count(), 4);
    }
}
