//! Plane cutting shared by windings and faces.

use crate::error::Result;
use crate::{Face, Plane3D, Winding};

/// Trait for geometry that can be cut by a plane.
///
/// Both operations consume the input: pieces that end up unchanged are moved
/// into the result rather than copied.
pub trait Cuttable: Sized {
    /// Keeps the part in front of the plane.
    ///
    /// With `keep_on`, geometry lying exactly on the plane survives.
    fn clip(self, plane: &Plane3D, keep_on: bool) -> Result<Option<Self>>;

    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)`:
    ///
    /// - **Front**: `(Some(self), None)` - nothing behind the plane
    /// - **Back** or **Coplanar**: `(None, Some(self))` - nothing in front
    /// - **Spanning**: `(Some(front_part), Some(back_part))`
    fn divide(self, plane: &Plane3D) -> Result<(Option<Self>, Option<Self>)>;
}

impl Cuttable for Winding {
    fn clip(self, plane: &Plane3D, keep_on: bool) -> Result<Option<Self>> {
        Winding::clip(self, plane, keep_on)
    }

    fn divide(self, plane: &Plane3D) -> Result<(Option<Self>, Option<Self>)> {
        Winding::divide(self, plane)
    }
}

impl Cuttable for Face {
    fn clip(self, plane: &Plane3D, keep_on: bool) -> Result<Option<Self>> {
        let (plane_id, surface) = (self.plane(), *self.surface());
        Ok(self
            .into_winding()
            .clip(plane, keep_on)?
            .map(|w| Face::new(w, plane_id, surface)))
    }

    fn divide(self, plane: &Plane3D) -> Result<(Option<Self>, Option<Self>)> {
        let (plane_id, surface) = (self.plane(), *self.surface());
        let (front, back) = self.into_winding().divide(plane)?;
        Ok((
            front.map(|w| Face::new(w, plane_id, surface)),
            back.map(|w| Face::new(w, plane_id, surface)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contents, PlaneId, SurfaceAttributes, TexInfoId};
    use nalgebra::{Point3, Vector3};

    fn make_face() -> Face {
        let winding = Winding::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(128.0, 0.0, 0.0),
            Point3::new(128.0, 64.0, 0.0),
            Point3::new(0.0, 64.0, 0.0),
        ])
        .unwrap();
        Face::new(
            winding,
            PlaneId(7),
            SurfaceAttributes::new(TexInfoId(3), Contents(-1)),
        )
    }

    #[test]
    fn divided_faces_keep_attributes() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 32.0);
        let face = make_face();
        let (front, back) = Cuttable::divide(face.clone(), &plane).unwrap();
        let front = front.unwrap();
        let back = back.unwrap();

        for piece in [&front, &back] {
            assert_eq!(piece.plane(), face.plane());
            assert_eq!(piece.surface(), face.surface());
        }
        assert!((front.winding().area() - 96.0 * 64.0).abs() < 1e-9);
        assert!((back.winding().area() - 32.0 * 64.0).abs() < 1e-9);
        assert_eq!(back.sphere().center, Point3::new(16.0, 32.0, 0.0));
    }

    #[test]
    fn one_sided_divide_moves_face() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 512.0);
        let face = make_face();
        let (front, back) = Cuttable::divide(face.clone(), &plane).unwrap();
        assert_eq!(front, None);
        assert_eq!(back, Some(face));
    }

    #[test]
    fn clip_face_keeps_front() {
        let plane = Plane3D::new(Vector3::new(0.0, -1.0, 0.0), -16.0);
        let clipped = Cuttable::clip(make_face(), &plane, false).unwrap().unwrap();
        assert!((clipped.winding().area() - 128.0 * 16.0).abs() < 1e-9);
        assert!((clipped.sphere().center.y - 8.0).abs() < 1e-9);
    }
}
