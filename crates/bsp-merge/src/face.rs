//! Faces: windings tagged with their plane and surface identity.

use std::fmt;

use crate::error::Result;
use crate::{BoundingSphere, Plane3D, PlaneId, PlaneTable, Winding};

/// Index of a texture projection in the map's texinfo table.
///
/// Opaque to this crate beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexInfoId(pub usize);

/// Contents classification of the volume a face bounds.
///
/// Opaque to this crate beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contents(pub i32);

/// Which half of its plane a face's points are wound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceSide {
    /// The face looks along the plane normal.
    #[default]
    Front,
    /// The face looks against the plane normal.
    Back,
}

/// Everything besides geometry that must match for two faces to merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceAttributes {
    pub side: FaceSide,
    pub texinfo: TexInfoId,
    pub contents: Contents,
    pub lmshift: i16,
}

impl SurfaceAttributes {
    pub fn new(texinfo: TexInfoId, contents: Contents) -> Self {
        Self {
            side: FaceSide::Front,
            texinfo,
            contents,
            lmshift: 4,
        }
    }

    pub fn with_side(mut self, side: FaceSide) -> Self {
        self.side = side;
        self
    }

    pub fn with_lmshift(mut self, lmshift: i16) -> Self {
        self.lmshift = lmshift;
        self
    }
}

/// A convex polygon on a map plane, with its surface attributes.
///
/// The bounding sphere is derived from the winding and kept in sync by every
/// method that replaces the winding.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    winding: Winding,
    plane: PlaneId,
    surface: SurfaceAttributes,
    sphere: BoundingSphere,
}

impl Face {
    /// Creates a face and computes its bounding sphere.
    pub fn new(winding: Winding, plane: PlaneId, surface: SurfaceAttributes) -> Self {
        let sphere = BoundingSphere::from_points(winding.points());
        Self {
            winding,
            plane,
            surface,
            sphere,
        }
    }

    /// Creates a face with the same plane and surface as `self` but a new winding.
    pub fn with_winding(&self, winding: Winding) -> Self {
        Self::new(winding, self.plane, self.surface)
    }

    #[inline]
    pub fn winding(&self) -> &Winding {
        &self.winding
    }

    /// Replaces the winding and refreshes the bounding sphere.
    pub fn set_winding(&mut self, winding: Winding) {
        self.sphere = BoundingSphere::from_points(winding.points());
        self.winding = winding;
    }

    pub fn into_winding(self) -> Winding {
        self.winding
    }

    #[inline]
    pub fn plane(&self) -> PlaneId {
        self.plane
    }

    #[inline]
    pub fn surface(&self) -> &SurfaceAttributes {
        &self.surface
    }

    #[inline]
    pub fn side(&self) -> FaceSide {
        self.surface.side
    }

    #[inline]
    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    /// Returns `true` if both faces lie on the same map plane and agree on
    /// side, texinfo, contents and lmshift.
    #[inline]
    pub fn is_merge_compatible(&self, other: &Face) -> bool {
        self.plane == other.plane && self.surface == other.surface
    }

    /// The plane the face's points are wound around: the map plane, flipped
    /// for back-side faces.
    pub fn facing_plane(&self, planes: &PlaneTable) -> Result<Plane3D> {
        let plane = planes.get(self.plane)?;
        Ok(match self.surface.side {
            FaceSide::Front => plane.clone(),
            FaceSide::Back => plane.flipped(),
        })
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "face on plane {} ({} points, texinfo {})",
            self.plane,
            self.winding.len(),
            self.surface.texinfo.0
        )
    }
}
