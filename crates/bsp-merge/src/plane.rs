//! Plane representation, point classification and the shared plane table.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::error::{GeometryError, Result};

/// Points within this distance of a plane are considered "on" the plane.
///
/// The tolerance is deliberately coarse: CSG output carries floating-point
/// noise well above machine epsilon.
pub const ON_EPSILON: f64 = 0.1;

/// Two plane normals are the same if every component differs by less than this.
pub const NORMAL_EPSILON: f64 = 0.000_001;

/// Two plane distances are the same if they differ by less than this.
pub const DIST_EPSILON: f64 = 0.000_1;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

impl PlaneSide {
    /// Side for a signed distance, with `epsilon` slack around the plane.
    #[inline]
    pub fn from_distance(dist: f64, epsilon: f64) -> Self {
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }
}

/// Classification of a winding relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No vertex is behind the plane, at least one is in front
    Front,
    /// No vertex is in front of the plane, at least one is behind
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices are on both sides
    Spanning,
}

/// A plane in 3D space, represented as `normal · point = dist`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f64>,
    dist: f64,
}

impl Plane3D {
    /// Creates a new plane from a normal vector and distance.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector3<f64>, dist: f64) -> Self {
        let norm = normal.norm();
        assert!(norm > f64::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / norm,
            dist: dist / norm,
        }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        let norm = normal.norm();
        assert!(norm > f64::EPSILON, "Plane normal cannot be zero");
        let unit_normal = normal / norm;
        let dist = unit_normal.dot(&point.coords);
        Self {
            normal: unit_normal,
            dist,
        }
    }

    /// Skips normalization so tests can build corrupt planes.
    #[cfg(test)]
    pub(crate) fn unchecked(normal: Vector3<f64>, dist: f64) -> Self {
        Self { normal, dist }
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.dist
    }

    /// Classifies which side of the plane a point lies on, using [`ON_EPSILON`].
    #[inline]
    pub fn classify_point(&self, point: Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, ON_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point3<f64>, epsilon: f64) -> PlaneSide {
        PlaneSide::from_distance(self.signed_distance(point), epsilon)
    }

    /// Returns the same plane facing the opposite direction.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            dist: -self.dist,
        }
    }

    /// Returns `true` if both planes match within [`NORMAL_EPSILON`] and [`DIST_EPSILON`].
    pub fn approx_eq(&self, other: &Plane3D) -> bool {
        (self.dist - other.dist).abs() < DIST_EPSILON
            && self
                .normal
                .iter()
                .zip(other.normal.iter())
                .all(|(a, b)| (a - b).abs() < NORMAL_EPSILON)
    }
}

/// Index of a plane in a [`PlaneTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaneId(pub usize);

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The map-wide plane table.
///
/// Faces and split nodes refer to planes by [`PlaneId`]. Planes are never
/// removed, so ids stay valid for the lifetime of the table.
#[derive(Debug, Clone, Default)]
pub struct PlaneTable {
    planes: Vec<Plane3D>,
}

impl PlaneTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plane and returns its id.
    pub fn insert(&mut self, plane: Plane3D) -> PlaneId {
        self.planes.push(plane);
        PlaneId(self.planes.len() - 1)
    }

    /// Returns the id of an existing matching plane, or appends a new one.
    pub fn find_or_insert(&mut self, plane: Plane3D) -> PlaneId {
        match self.planes.iter().position(|p| p.approx_eq(&plane)) {
            Some(index) => PlaneId(index),
            None => self.insert(plane),
        }
    }

    /// Looks up a plane.
    pub fn get(&self, id: PlaneId) -> Result<&Plane3D> {
        self.planes.get(id.0).ok_or(GeometryError::UnknownPlane(id))
    }

    /// Number of planes in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Returns `true` if the table holds no planes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_normal_and_dist() {
        let plane = Plane3D::new(Vector3::new(0.0, 0.0, 4.0), 8.0);
        assert_eq!(plane.normal(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(plane.dist(), 2.0);
    }

    #[test]
    fn classify_uses_on_epsilon() {
        let plane = Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        assert_eq!(plane.classify_point(Point3::new(3.0, 2.0, 0.05)), PlaneSide::OnPlane);
        assert_eq!(plane.classify_point(Point3::new(3.0, 2.0, -0.1)), PlaneSide::OnPlane);
        assert_eq!(plane.classify_point(Point3::new(3.0, 2.0, 0.2)), PlaneSide::Front);
        assert_eq!(plane.classify_point(Point3::new(3.0, 2.0, -0.2)), PlaneSide::Back);
    }

    #[test]
    fn flipped_reverses_sides() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 16.0);
        let point = Point3::new(32.0, 0.0, 0.0);
        assert_eq!(plane.classify_point(point), PlaneSide::Front);
        assert_eq!(plane.flipped().classify_point(point), PlaneSide::Back);
    }

    #[test]
    fn side_from_distance_is_inclusive_at_epsilon() {
        assert_eq!(PlaneSide::from_distance(ON_EPSILON, ON_EPSILON), PlaneSide::OnPlane);
        assert_eq!(PlaneSide::from_distance(-ON_EPSILON, ON_EPSILON), PlaneSide::OnPlane);
        assert_eq!(PlaneSide::from_distance(0.100_1, ON_EPSILON), PlaneSide::Front);
        assert_eq!(PlaneSide::from_distance(-0.100_1, ON_EPSILON), PlaneSide::Back);
        assert_eq!(PlaneSide::from_distance(0.05, 0.01), PlaneSide::Front);
    }

    #[test]
    fn table_reuses_matching_planes() {
        let mut table = PlaneTable::new();
        let a = table.find_or_insert(Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 64.0));
        let b = table.find_or_insert(Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 64.000_01));
        let c = table.find_or_insert(Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 65.0));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unknown_plane_is_an_error() {
        let table = PlaneTable::new();
        assert_eq!(
            table.get(PlaneId(3)),
            Err(GeometryError::UnknownPlane(PlaneId(3)))
        );
    }
}
