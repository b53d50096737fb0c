//! Read-only passes over the face lists of a tree.
//!
//! [`BspTree::walk`](super::BspTree::walk) hands every node's faces to a
//! [`FaceListVisitor`] together with the node's pre-order index, the same
//! index the merge pass reports in its errors.

use std::fmt;

use crate::error::MergeError;
use crate::{Face, PlaneTable};

/// Receives the face list of every node during a walk.
pub trait FaceListVisitor {
    /// Called once per node, in pre-order. Nodes without faces are visited
    /// too, with an empty slice. An error stops the walk.
    fn visit(&mut self, node: usize, faces: &[Face]) -> Result<(), MergeError>;
}

impl<F> FaceListVisitor for F
where
    F: FnMut(usize, &[Face]) -> Result<(), MergeError>,
{
    fn visit(&mut self, node: usize, faces: &[Face]) -> Result<(), MergeError> {
        self(node, faces)
    }
}

/// Face, point and area totals over a tree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceStats {
    /// Nodes visited.
    pub nodes: usize,
    /// Nodes with at least one face.
    pub nodes_with_faces: usize,
    /// Faces over all nodes.
    pub faces: usize,
    /// Winding points over all faces.
    pub points: usize,
    /// Point count of the largest winding.
    pub max_points: usize,
    /// Summed winding area.
    pub area: f64,
}

impl FaceStats {
    /// Mean points per face, 0.0 without faces.
    pub fn average_points(&self) -> f64 {
        if self.faces == 0 {
            0.0
        } else {
            self.points as f64 / self.faces as f64
        }
    }
}

impl FaceListVisitor for FaceStats {
    fn visit(&mut self, _node: usize, faces: &[Face]) -> Result<(), MergeError> {
        self.nodes += 1;
        if !faces.is_empty() {
            self.nodes_with_faces += 1;
        }
        for face in faces {
            let points = face.winding().len();
            self.faces += 1;
            self.points += points;
            self.max_points = self.max_points.max(points);
            self.area += face.winding().area();
        }
        Ok(())
    }
}

impl fmt::Display for FaceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:8} faces in {} of {} nodes ({:.1} points avg, {} max)",
            self.faces,
            self.nodes_with_faces,
            self.nodes,
            self.average_points(),
            self.max_points
        )
    }
}

/// Runs [`Winding::check`](crate::Winding::check) on every face against its
/// facing plane.
#[derive(Debug, Clone, Copy)]
pub struct WindingValidator<'a> {
    planes: &'a PlaneTable,
    checked: usize,
}

impl<'a> WindingValidator<'a> {
    pub fn new(planes: &'a PlaneTable) -> Self {
        Self { planes, checked: 0 }
    }

    /// Faces that passed so far.
    pub fn checked(&self) -> usize {
        self.checked
    }
}

impl FaceListVisitor for WindingValidator<'_> {
    fn visit(&mut self, node: usize, faces: &[Face]) -> Result<(), MergeError> {
        for (face_index, face) in faces.iter().enumerate() {
            face.facing_plane(self.planes)
                .and_then(|plane| face.winding().check(&plane))
                .map_err(|source| MergeError::InvalidFace {
                    node,
                    face: face_index,
                    source,
                })?;
            self.checked += 1;
        }
        Ok(())
    }
}
