//! Tree-wide face merging.
//!
//! Every node's face list is merged and re-subdivided independently. The
//! lists are gathered up front, then handed to the rayon pool one task per
//! node; the only shared state is a pair of atomic face counters.

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info};
use rayon::prelude::*;

use crate::error::MergeError;
use crate::{Face, FaceMerger, MergeConfig, PlaneTable, Subdivider};

use super::node::{collect_face_lists, BspNode};

/// Face counts before and after a merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Faces in the tree before merging.
    pub premerge: usize,
    /// Faces in the tree after merging and re-subdivision.
    pub merged: usize,
}

impl MergeStats {
    /// `merged / premerge`, or 1.0 for a tree without faces.
    pub fn ratio(&self) -> f64 {
        if self.premerge == 0 {
            1.0
        } else {
            self.merged as f64 / self.premerge as f64
        }
    }
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:8} mergefaces (from {}; {:.0}% merged)",
            self.merged,
            self.premerge,
            self.ratio() * 100.0
        )
    }
}

/// Merges the face lists of every node under `root` on the rayon pool.
pub(crate) fn merge_tree<S>(
    root: &mut BspNode,
    planes: &PlaneTable,
    subdivider: &S,
    config: MergeConfig,
) -> Result<MergeStats, MergeError>
where
    S: Subdivider + ?Sized,
{
    info!("---- merge_all ----");

    let merger = FaceMerger::new(planes, config);
    let premerge = AtomicUsize::new(0);
    let merged = AtomicUsize::new(0);

    let mut lists = Vec::new();
    collect_face_lists(root, &mut lists);

    lists
        .into_par_iter()
        .enumerate()
        .try_for_each(|(node, faces)| {
            let (before, after) = merge_node(node, faces, &merger, subdivider)?;
            premerge.fetch_add(before, Ordering::Relaxed);
            merged.fetch_add(after, Ordering::Relaxed);
            Ok(())
        })?;

    let stats = MergeStats {
        premerge: premerge.into_inner(),
        merged: merged.into_inner(),
    };
    info!("{stats}");
    Ok(stats)
}

/// Single-threaded version of [`merge_tree`], visiting nodes in pre-order.
pub(crate) fn merge_tree_serial<S>(
    root: &mut BspNode,
    planes: &PlaneTable,
    subdivider: &S,
    config: MergeConfig,
) -> Result<MergeStats, MergeError>
where
    S: Subdivider + ?Sized,
{
    info!("---- merge_all (serial) ----");

    let merger = FaceMerger::new(planes, config);
    let mut lists = Vec::new();
    collect_face_lists(root, &mut lists);

    let mut stats = MergeStats::default();
    for (node, faces) in lists.into_iter().enumerate() {
        let (before, after) = merge_node(node, faces, &merger, subdivider)?;
        stats.premerge += before;
        stats.merged += after;
    }

    info!("{stats}");
    Ok(stats)
}

/// Merges one face list in place and re-subdivides the result.
///
/// Returns the face counts before and after. On error the list is left empty.
fn merge_node<S>(
    node: usize,
    faces: &mut Vec<Face>,
    merger: &FaceMerger<'_>,
    subdivider: &S,
) -> Result<(usize, usize), MergeError>
where
    S: Subdivider + ?Sized,
{
    let before = faces.len();
    if before == 0 {
        return Ok((0, 0));
    }

    let merged = merger
        .merge_face_list(mem::take(faces))
        .map_err(|source| MergeError::Node { node, source })?;
    let merged_count = merged.len();

    let mut result = Vec::with_capacity(merged_count);
    for (face, merged_face) in merged.into_iter().enumerate() {
        let pieces = subdivider
            .subdivide(merged_face, merger.planes())
            .map_err(|source| MergeError::Face { node, face, source })?;
        result.extend(pieces);
    }

    debug!(
        "node {node}: {before} faces, {merged_count} after merge, {} after subdivide",
        result.len()
    );

    let after = result.len();
    *faces = result;
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::BspTree;
    use crate::error::{GeometryError, Result};
    use crate::{
        AxialSubdivider, Contents, Cuttable, NoSubdivision, Plane3D, PlaneId, SurfaceAttributes,
        TexInfoId, Winding,
    };
    use nalgebra::{Point3, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EMPTY: Contents = Contents(-1);
    const SOLID: Contents = Contents(-2);

    fn make_planes() -> (PlaneTable, PlaneId, PlaneId) {
        let mut planes = PlaneTable::new();
        let floor = planes.insert(Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 0.0));
        let wall = planes.insert(Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 0.0));
        (planes, floor, wall)
    }

    /// Axis-aligned square on z = 0 with its low corner at `(x, y)`.
    fn make_square(plane: PlaneId, x: f64, y: f64, size: f64) -> Face {
        let winding = Winding::from_points(vec![
            Point3::new(x, y, 0.0),
            Point3::new(x + size, y, 0.0),
            Point3::new(x + size, y + size, 0.0),
            Point3::new(x, y + size, 0.0),
        ])
        .unwrap();
        Face::new(winding, plane, SurfaceAttributes::new(TexInfoId(0), EMPTY))
    }

    /// An `n` by `n` grid of squares with edge `size`.
    fn make_grid(plane: PlaneId, n: usize, size: f64) -> Vec<Face> {
        (0..n * n)
            .map(|i| make_square(plane, (i % n) as f64 * size, (i / n) as f64 * size, size))
            .collect()
    }

    /// A split node with faces on the split node and on both leaves.
    fn make_tree(floor: PlaneId, wall: PlaneId) -> BspTree {
        let front = BspNode::leaf(EMPTY).with_faces(make_grid(floor, 3, 1.0));
        let back = BspNode::leaf(SOLID).with_faces(vec![make_square(floor, 10.0, 10.0, 1.0)]);
        let root = BspNode::split(wall, front, back).with_faces(make_grid(floor, 2, 1.0));
        BspTree::from_root(root)
    }

    fn node_areas(tree: &BspTree) -> Vec<f64> {
        let mut areas: Vec<f64> = Vec::new();
        tree.walk(&mut |_: usize, faces: &[Face]| {
            areas.push(faces.iter().map(|f| f.winding().area()).sum::<f64>());
            Ok::<(), MergeError>(())
        })
        .unwrap();
        areas
    }

    #[test]
    fn stats_format_and_ratio() {
        let stats = MergeStats {
            premerge: 40,
            merged: 10,
        };
        assert_eq!(stats.ratio(), 0.25);
        assert_eq!(stats.to_string(), "      10 mergefaces (from 40; 25% merged)");
        assert_eq!(MergeStats::default().ratio(), 1.0);
    }

    #[test]
    fn empty_tree_reports_zero() {
        let (planes, _, _) = make_planes();
        let mut tree = BspTree::from_root(BspNode::leaf(SOLID));
        let stats = tree
            .merge_all(&planes, &NoSubdivision, MergeConfig::default())
            .unwrap();
        assert_eq!(stats, MergeStats::default());
    }

    #[test]
    fn merges_split_and_leaf_nodes() {
        let (planes, floor, wall) = make_planes();
        let mut tree = make_tree(floor, wall);
        let areas = node_areas(&tree);

        let stats = tree
            .merge_all(&planes, &NoSubdivision, MergeConfig::default())
            .unwrap();

        assert_eq!(stats.premerge, 4 + 9 + 1);
        assert_eq!(stats.merged, tree.face_count());
        assert!(stats.merged < stats.premerge);

        let root = tree.root().unwrap();
        assert!(root.faces().len() < 4);
        assert!(root.front().unwrap().faces().len() < 9);
        assert_eq!(root.back().unwrap().faces().len(), 1);

        for (before, after) in areas.iter().zip(node_areas(&tree)) {
            assert!((before - after).abs() < 1e-9);
        }
        assert_eq!(tree.check_faces(&planes), Ok(stats.merged));
    }

    #[test]
    fn parallel_matches_serial() {
        let (planes, floor, wall) = make_planes();
        let mut parallel = make_tree(floor, wall);
        let mut serial = parallel.clone();
        let subdivider = AxialSubdivider::new(2.0);

        let a = parallel
            .merge_all(&planes, &subdivider, MergeConfig::default())
            .unwrap();
        let b = serial
            .merge_all_serial(&planes, &subdivider, MergeConfig::default())
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn merged_faces_are_resubdivided() {
        let (planes, floor, _) = make_planes();
        let root = BspNode::leaf(EMPTY).with_faces(make_grid(floor, 4, 64.0));
        let mut tree = BspTree::from_root(root);

        let stats = tree
            .merge_all(&planes, &AxialSubdivider::new(128.0), MergeConfig::default())
            .unwrap();

        assert_eq!(stats.premerge, 16);
        let faces = tree.collect_faces();
        assert_eq!(faces.len(), stats.merged);
        let area: f64 = faces.iter().map(|f| f.winding().area()).sum();
        assert!((area - 256.0 * 256.0).abs() < 1e-6);
        for face in &faces {
            let (mins, maxs) = face.winding().bounds().unwrap();
            assert!(maxs.x - mins.x <= 128.0 + 1e-9);
            assert!(maxs.y - mins.y <= 128.0 + 1e-9);
        }
    }

    #[test]
    fn unknown_plane_reports_node() {
        let (planes, floor, wall) = make_planes();
        let bogus = PlaneId(99);
        let back = BspNode::leaf(SOLID)
            .with_faces(vec![make_square(bogus, 0.0, 0.0, 1.0), make_square(bogus, 1.0, 0.0, 1.0)]);
        let root = BspNode::split(wall, BspNode::leaf(EMPTY), back)
            .with_faces(vec![make_square(floor, 0.0, 0.0, 1.0)]);
        let mut tree = BspTree::from_root(root);

        let err = tree
            .merge_all(&planes, &NoSubdivision, MergeConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::Node {
                node: 2,
                source: GeometryError::UnknownPlane(bogus),
            }
        );
    }

    #[test]
    fn subdivider_failure_reports_face() {
        let (planes, floor, _) = make_planes();
        let root = BspNode::leaf(EMPTY).with_faces(vec![
            make_square(floor, 0.0, 0.0, 1.0),
            make_square(floor, 5.0, 0.0, 1.0),
        ]);
        let mut tree = BspTree::from_root(root);

        let reject_far = |face: Face, _: &PlaneTable| -> Result<Vec<Face>> {
            if face.winding().points()[0].x > 2.0 {
                return Err(GeometryError::InvalidWinding("too far".into()));
            }
            Ok(vec![face])
        };

        let err = tree
            .merge_all_serial(&planes, &reject_far, MergeConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::Face {
                node: 0,
                face: 1,
                source: GeometryError::InvalidWinding("too far".into()),
            }
        );
    }

    #[test]
    fn random_fragments_keep_area_per_node() {
        let (planes, floor, wall) = make_planes();
        let mut rng = StdRng::seed_from_u64(7);

        let mut shatter = |size: f64| -> Vec<Face> {
            let mut pieces = vec![make_square(floor, 0.0, 0.0, size)];
            for _ in 0..6 {
                let normal = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0);
                if normal.norm() < 0.1 {
                    continue;
                }
                let cut = Plane3D::from_point_and_normal(
                    Point3::new(rng.gen_range(0.0..size), rng.gen_range(0.0..size), 0.0),
                    normal,
                );
                pieces = pieces
                    .into_iter()
                    .flat_map(|piece| {
                        let (front, back) = piece.divide(&cut).unwrap();
                        front.into_iter().chain(back)
                    })
                    .collect();
            }
            pieces
        };

        let front = BspNode::leaf(EMPTY).with_faces(shatter(64.0));
        let back = BspNode::leaf(SOLID).with_faces(shatter(32.0));
        let mut tree =
            BspTree::from_root(BspNode::split(wall, front, back).with_faces(shatter(128.0)));
        let areas = node_areas(&tree);

        tree.merge_all(&planes, &NoSubdivision, MergeConfig::default())
            .unwrap();

        for (before, after) in areas.iter().zip(node_areas(&tree)) {
            assert!((before - after).abs() < 1e-4 * before.max(1.0));
        }
        assert_eq!(tree.face_stats().faces, tree.face_count());
    }
}
