//! Re-subdivision of merged faces.
//!
//! Lightmaps and surface caches have a maximum size, so after merging every
//! face is cut back down until it fits. The merge pass only knows the
//! [`Subdivider`] interface; the map compiler decides how faces are cut.

use nalgebra::Vector3;

use crate::error::Result;
use crate::{Cuttable, Face, Plane3D, PlaneTable};

/// Default largest extent of a face along either subdivision axis.
pub const SUBDIVIDE_SIZE: f64 = 240.0;

/// Cuts one face into pieces small enough for later stages.
///
/// Implementations must always terminate and must cover exactly the area of
/// the input face with the returned pieces.
pub trait Subdivider: Sync {
    fn subdivide(&self, face: Face, planes: &PlaneTable) -> Result<Vec<Face>>;
}

impl<F> Subdivider for F
where
    F: Fn(Face, &PlaneTable) -> Result<Vec<Face>> + Sync,
{
    fn subdivide(&self, face: Face, planes: &PlaneTable) -> Result<Vec<Face>> {
        self(face, planes)
    }
}

/// Leaves faces as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubdivision;

impl Subdivider for NoSubdivision {
    fn subdivide(&self, face: Face, _planes: &PlaneTable) -> Result<Vec<Face>> {
        Ok(vec![face])
    }
}

/// Splits faces along the two world axes closest to their plane until neither
/// extent exceeds `size`.
#[derive(Debug, Clone, Copy)]
pub struct AxialSubdivider {
    size: f64,
}

impl Default for AxialSubdivider {
    fn default() -> Self {
        Self::new(SUBDIVIDE_SIZE)
    }
}

impl AxialSubdivider {
    /// # Panics
    /// Panics if `size` is not positive.
    pub fn new(size: f64) -> Self {
        assert!(size > 0.0, "Subdivide size must be positive");
        Self { size }
    }

    #[inline]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Cuts `face` along `axis` until its extent fits, pushing pieces into `out`.
    fn split_along(&self, face: Face, axis: usize, out: &mut Vec<Face>) -> Result<()> {
        let mut rest = face;
        loop {
            let (mins, maxs) = extent(&rest, axis);
            if maxs - mins <= self.size {
                out.push(rest);
                return Ok(());
            }

            let mut normal = Vector3::zeros();
            normal[axis] = 1.0;
            let cut = Plane3D::new(normal, mins + self.size);

            match rest.divide(&cut)? {
                (Some(front), Some(back)) => {
                    out.push(back);
                    rest = front;
                }
                // the far points sit within epsilon of the cut
                (front, back) => {
                    out.extend(front.or(back));
                    return Ok(());
                }
            }
        }
    }
}

impl Subdivider for AxialSubdivider {
    fn subdivide(&self, face: Face, planes: &PlaneTable) -> Result<Vec<Face>> {
        let normal = planes.get(face.plane())?.normal();
        let dominant = (0..3)
            .max_by(|&a, &b| normal[a].abs().total_cmp(&normal[b].abs()))
            .unwrap_or(2);

        let mut pieces = vec![face];
        for axis in (0..3).filter(|&axis| axis != dominant) {
            let mut next = Vec::with_capacity(pieces.len());
            for piece in pieces {
                self.split_along(piece, axis, &mut next)?;
            }
            pieces = next;
        }

        Ok(pieces)
    }
}

fn extent(face: &Face, axis: usize) -> (f64, f64) {
    face.winding()
        .points()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mins, maxs), p| {
            (mins.min(p[axis]), maxs.max(p[axis]))
        })
}
