//! Re-merging coplanar face fragments into maximal convex polygons.
//!
//! CSG and BSP construction chop faces into many small fragments. Two
//! fragments can be joined again when they share an edge, have identical
//! surface attributes, and the union is still convex. Junction vertices that
//! end up collinear with their neighbours are dropped from the merged winding.

use log::warn;
use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::{Face, MergeConfig, PlaneTable, Winding};

/// Merges faces that live on one plane table.
#[derive(Debug, Clone, Copy)]
pub struct FaceMerger<'a> {
    planes: &'a PlaneTable,
    config: MergeConfig,
}

impl<'a> FaceMerger<'a> {
    pub fn new(planes: &'a PlaneTable, config: MergeConfig) -> Self {
        Self { planes, config }
    }

    #[inline]
    pub fn planes(&self) -> &'a PlaneTable {
        self.planes
    }

    #[inline]
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Tries to join two faces into one convex face.
    ///
    /// Returns `Ok(None)` if the faces are incompatible, share no edge, would
    /// form a non-convex polygon, or would have too many edges. The inputs are
    /// left untouched; on success the caller should drop both.
    ///
    /// Errors only for structural problems such as an unknown plane.
    pub fn try_merge(&self, f1: &Face, f2: &Face) -> Result<Option<Face>> {
        let w1 = f1.winding().points();
        let w2 = f2.winding().points();

        if w1.is_empty() || w2.is_empty() || !f1.is_merge_compatible(f2) {
            return Ok(None);
        }

        let Some((i, j)) = find_shared_edge(w1, w2, self.config.equal_epsilon) else {
            return Ok(None);
        };

        let n1 = w1.len();
        let n2 = w2.len();
        let p1 = w1[i];
        let p2 = w1[(i + 1) % n1];
        let normal = f1.facing_plane(self.planes)?.normal();
        let epsilon = self.config.continuous_epsilon;

        // the f1 edge running into p1 continues into f2
        let Some(keep1) = junction(
            p1 - w1[(i + n1 - 1) % n1],
            w2[(j + 2) % n2] - p1,
            &normal,
            epsilon,
        ) else {
            return Ok(None);
        };

        // the f1 edge leaving p2 continues back into f2
        let Some(keep2) = junction(
            w1[(i + 2) % n1] - p2,
            w2[(j + n2 - 1) % n2] - p2,
            &normal,
            epsilon,
        ) else {
            return Ok(None);
        };

        if n1 + n2 > self.config.edge_limit() {
            warn!(
                "too many edges merging faces on plane {} ({} + {} points)",
                f1.plane(),
                n1,
                n2
            );
            return Ok(None);
        }

        let mut merged = Winding::with_capacity(n1 + n2);

        // f1 from p2 round to the point before p1
        let mut k = if keep2 { (i + 1) % n1 } else { (i + 2) % n1 };
        while k != i {
            merged.push(w1[k])?;
            k = (k + 1) % n1;
        }

        // f2 from p1 round to the point before p2
        let mut l = if keep1 { (j + 1) % n2 } else { (j + 2) % n2 };
        while l != j {
            merged.push(w2[l])?;
            l = (l + 1) % n2;
        }

        if merged.len() < 3 {
            return Ok(None);
        }

        Ok(Some(f1.with_winding(merged)))
    }

    /// Merges `face` into `list`.
    ///
    /// Every successful merge consumes the list entry and restarts the scan
    /// from the front, since the larger face may now join an entry it skipped
    /// earlier. The face that remains is appended.
    pub fn merge_face_to_list(&self, mut face: Face, list: &mut Vec<Face>) -> Result<()> {
        let mut index = 0;
        while index < list.len() {
            match self.try_merge(&face, &list[index])? {
                Some(merged) => {
                    list.remove(index);
                    face = merged;
                    index = 0;
                }
                None => index += 1,
            }
        }

        list.push(face);
        Ok(())
    }

    /// Merges a face list as far as the greedy pairwise test allows.
    ///
    /// The output order follows from the merge order and is deterministic for
    /// a fixed input order.
    pub fn merge_face_list(&self, faces: Vec<Face>) -> Result<Vec<Face>> {
        let mut merged = Vec::with_capacity(faces.len());
        for face in faces {
            self.merge_face_to_list(face, &mut merged)?;
        }
        Ok(merged)
    }
}

/// Finds `(i, j)` such that edge `w1[i] -> w1[i + 1]` is edge
/// `w2[j] -> w2[j + 1]` reversed.
fn find_shared_edge(w1: &[Point3<f64>], w2: &[Point3<f64>], epsilon: f64) -> Option<(usize, usize)> {
    let n1 = w1.len();
    let n2 = w2.len();

    (0..n1).find_map(|i| {
        let p1 = w1[i];
        let p2 = w1[(i + 1) % n1];
        (0..n2)
            .find(|&j| {
                points_equal(p1, w2[(j + 1) % n2], epsilon) && points_equal(p2, w2[j], epsilon)
            })
            .map(|j| (i, j))
    })
}

#[inline]
fn points_equal(a: Point3<f64>, b: Point3<f64>, epsilon: f64) -> bool {
    (a - b).iter().all(|d| d.abs() <= epsilon)
}

/// Convexity test at a junction vertex of the merged polygon.
///
/// `edge` runs along the first face's boundary at the junction; its outward
/// normal splits the plane. `across` points from the junction to the second
/// face's neighbouring vertex. Returns `None` if that vertex is outside
/// (a reflex corner), otherwise whether the junction vertex must be kept.
fn junction(
    edge: Vector3<f64>,
    across: Vector3<f64>,
    normal: &Vector3<f64>,
    epsilon: f64,
) -> Option<bool> {
    let outward = edge.cross(normal).try_normalize(f64::EPSILON)?;
    let dot = across.dot(&outward);
    if dot > epsilon {
        return None;
    }
    Some(dot < -epsilon)
}
