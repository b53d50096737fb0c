//! Convex windings: the point loops every face and portal is built from.

use nalgebra::{Point3, Vector3};

use crate::error::{GeometryError, Result};
use crate::{Classification, Plane3D, PlaneSide, ON_EPSILON};

/// Hard cap on the number of points a winding may hold.
pub const MAX_POINTS_ON_WINDING: usize = 64;

/// Half the side length of the quad returned by [`Winding::base_for_plane`].
pub const BASE_WINDING_HALF_SIZE: f64 = 8192.0;

/// Coordinates beyond this magnitude mean the geometry has escaped the world.
pub const BOGUS_RANGE: f64 = 65536.0;

/// Clipping a convex winding adds at most two points; the rest is room for
/// floating-point grouping errors in the side classification.
const CLIP_SLACK: usize = 4;

/// A convex polygon in 3D space, stored as an ordered loop of points.
///
/// Points are counter-clockwise when viewed from the front of the winding's
/// plane, so `(p1 - p0) × (p2 - p0)` points along the plane normal. An empty
/// winding is allowed and means "nothing here".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Winding {
    points: Vec<Point3<f64>>,
}

impl Winding {
    /// Creates an empty winding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a winding from a list of points.
    ///
    /// Fails if there are more than [`MAX_POINTS_ON_WINDING`] points.
    pub fn from_points(points: Vec<Point3<f64>>) -> Result<Self> {
        if points.len() > MAX_POINTS_ON_WINDING {
            return Err(GeometryError::TooManyPoints {
                points: points.len(),
                max: MAX_POINTS_ON_WINDING,
            });
        }
        Ok(Self { points })
    }

    /// Creates an empty winding with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity.min(MAX_POINTS_ON_WINDING)),
        }
    }

    /// Builds a huge quad lying on `plane`.
    ///
    /// The quad is centered on the projection of the origin onto the plane and
    /// extends [`BASE_WINDING_HALF_SIZE`] in each in-plane direction. Every
    /// brush face and portal starts from one of these and is clipped down.
    pub fn base_for_plane(plane: &Plane3D) -> Result<Self> {
        let normal = plane.normal();

        // find the major axis
        let mut max = 0.0_f64;
        let mut axis = None;
        for (i, component) in normal.iter().enumerate() {
            let v = component.abs();
            if v > max {
                max = v;
                axis = Some(i);
            }
        }

        let mut up = match axis {
            Some(0 | 1) if max.is_finite() => Vector3::z(),
            Some(2) if max.is_finite() => Vector3::x(),
            _ => return Err(GeometryError::NoWindingAxis { normal }),
        };

        up -= normal * up.dot(&normal);
        up.normalize_mut();

        let origin = Point3::from(normal * plane.dist());
        let right = up.cross(&normal) * BASE_WINDING_HALF_SIZE;
        let up = up * BASE_WINDING_HALF_SIZE;

        Self::from_points(vec![
            origin - right - up,
            origin + right - up,
            origin + right + up,
            origin - right + up,
        ])
    }

    /// Returns the points of the winding.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the winding has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a point, failing once the winding is full.
    pub fn push(&mut self, point: Point3<f64>) -> Result<()> {
        if self.points.len() >= MAX_POINTS_ON_WINDING {
            return Err(GeometryError::TooManyPoints {
                points: self.points.len() + 1,
                max: MAX_POINTS_ON_WINDING,
            });
        }
        self.points.push(point);
        Ok(())
    }

    /// Consumes the winding, returning its points.
    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Arithmetic mean of the points. Cheap, but not the true area centroid.
    pub fn midpoint(&self) -> Point3<f64> {
        if self.points.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.points.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.points.len() as f64)
    }

    /// Twice the vector area: its direction is the winding normal, its length
    /// twice the area.
    fn area_vector(&self) -> Vector3<f64> {
        let Some(first) = self.points.first() else {
            return Vector3::zeros();
        };
        self.points
            .windows(2)
            .skip(1)
            .map(|pair| (pair[0] - first).cross(&(pair[1] - first)))
            .sum()
    }

    /// Area of the polygon.
    pub fn area(&self) -> f64 {
        self.area_vector().norm() * 0.5
    }

    /// Unit normal derived from the point order, or `None` for a degenerate winding.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.area_vector().try_normalize(f64::EPSILON)
    }

    /// The plane the winding lies on, or `None` for a degenerate winding.
    pub fn plane(&self) -> Option<Plane3D> {
        let normal = self.normal()?;
        Some(Plane3D::from_point_and_normal(self.midpoint(), normal))
    }

    /// Axis-aligned bounds as `(mins, maxs)`, or `None` when empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(mins, maxs), p| {
            (
                Point3::from(mins.coords.inf(&p.coords)),
                Point3::from(maxs.coords.sup(&p.coords)),
            )
        }))
    }

    /// Returns the same polygon facing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Classifies this winding relative to a plane.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let sides = SideCounts::new(&self.points, plane);

        if sides.front == 0 && sides.back == 0 {
            Classification::Coplanar
        } else if sides.back == 0 {
            Classification::Front
        } else if sides.front == 0 {
            Classification::Back
        } else {
            Classification::Spanning
        }
    }

    fn require_polygon(&self) -> Result<()> {
        if self.points.len() < 3 {
            return Err(GeometryError::DegenerateWinding {
                points: self.points.len(),
            });
        }
        Ok(())
    }

    /// Clips the winding to the front half-space of `plane`.
    ///
    /// Returns `None` when nothing is left in front. A winding lying on the
    /// plane is kept if `keep_on` is set and clipped away otherwise. When no
    /// point is behind the plane the input is returned as is.
    pub fn clip(self, plane: &Plane3D, keep_on: bool) -> Result<Option<Self>> {
        self.require_polygon()?;
        let sides = SideCounts::new(&self.points, plane);

        if keep_on && sides.front == 0 && sides.back == 0 {
            return Ok(Some(self));
        }
        if sides.front == 0 {
            return Ok(None);
        }
        if sides.back == 0 {
            return Ok(Some(self));
        }

        let max = self.points.len() + CLIP_SLACK;
        let mut clipped = Vec::with_capacity(max);
        let n = self.points.len();

        for i in 0..n {
            let p1 = self.points[i];
            let side = sides.sides[i];

            match side {
                PlaneSide::OnPlane => {
                    clipped.push(p1);
                    continue;
                }
                PlaneSide::Front => clipped.push(p1),
                PlaneSide::Back => {}
            }

            let next = (i + 1) % n;
            let next_side = sides.sides[next];
            if next_side == PlaneSide::OnPlane || next_side == side {
                continue;
            }

            clipped.push(split_point(
                p1,
                self.points[next],
                sides.dists[i],
                sides.dists[next],
                plane,
            ));
        }

        if clipped.len() > max {
            return Err(GeometryError::PointOverflow {
                points: clipped.len(),
                max,
            });
        }

        Self::from_points(clipped).map(Some)
    }

    /// Divides the winding by `plane` into `(front, back)` pieces.
    ///
    /// Split points are computed once and shared by both pieces, so the two
    /// halves meet exactly along the cut. If the winding does not span the
    /// plane it is moved whole into the side it lies on; a winding with no
    /// point strictly in front goes to the back.
    pub fn divide(self, plane: &Plane3D) -> Result<(Option<Self>, Option<Self>)> {
        self.require_polygon()?;
        let sides = SideCounts::new(&self.points, plane);

        if sides.front == 0 {
            return Ok((None, Some(self)));
        }
        if sides.back == 0 {
            return Ok((Some(self), None));
        }

        let max = self.points.len() + CLIP_SLACK;
        let mut front = Vec::with_capacity(max);
        let mut back = Vec::with_capacity(max);
        let n = self.points.len();

        for i in 0..n {
            let p1 = self.points[i];
            let side = sides.sides[i];

            match side {
                PlaneSide::OnPlane => {
                    front.push(p1);
                    back.push(p1);
                    continue;
                }
                PlaneSide::Front => front.push(p1),
                PlaneSide::Back => back.push(p1),
            }

            let next = (i + 1) % n;
            let next_side = sides.sides[next];
            if next_side == PlaneSide::OnPlane || next_side == side {
                continue;
            }

            let mid = split_point(
                p1,
                self.points[next],
                sides.dists[i],
                sides.dists[next],
                plane,
            );
            front.push(mid);
            back.push(mid);
        }

        if front.len() > max || back.len() > max {
            return Err(GeometryError::PointOverflow {
                points: front.len().max(back.len()),
                max,
            });
        }

        Ok((
            Some(Self::from_points(front)?),
            Some(Self::from_points(back)?),
        ))
    }

    /// Validates the winding against the plane it is supposed to lie on.
    ///
    /// Checks point count, coordinate range, distance to the plane, edge
    /// length and convexity. Used to pin down upstream geometry bugs.
    pub fn check(&self, plane: &Plane3D) -> Result<()> {
        let n = self.points.len();
        if n < 3 {
            return Err(GeometryError::InvalidWinding(format!("{n} points")));
        }

        let normal = plane.normal();
        for (i, p1) in self.points.iter().enumerate() {
            if p1.iter().any(|c| !c.is_finite() || c.abs() > BOGUS_RANGE) {
                return Err(GeometryError::InvalidWinding(format!(
                    "point {i} out of range: {p1:?}"
                )));
            }

            let d = plane.signed_distance(*p1);
            if d.abs() > ON_EPSILON {
                return Err(GeometryError::InvalidWinding(format!(
                    "point {i} is {d} off plane"
                )));
            }

            let p2 = self.points[(i + 1) % n];
            let dir = p2 - p1;
            if dir.norm() < ON_EPSILON {
                return Err(GeometryError::InvalidWinding(format!(
                    "degenerate edge at point {i}"
                )));
            }

            // every other point must be behind the outward edge plane
            let edge_normal = dir.cross(&normal).normalize();
            let edge_dist = edge_normal.dot(&p1.coords) + ON_EPSILON;
            if self
                .points
                .iter()
                .any(|p| edge_normal.dot(&p.coords) > edge_dist)
            {
                return Err(GeometryError::InvalidWinding(format!(
                    "non-convex at edge {i}"
                )));
            }
        }

        Ok(())
    }
}

/// Per-point plane distances and sides, with totals.
struct SideCounts {
    dists: Vec<f64>,
    sides: Vec<PlaneSide>,
    front: usize,
    back: usize,
}

impl SideCounts {
    fn new(points: &[Point3<f64>], plane: &Plane3D) -> Self {
        let mut counts = Self {
            dists: Vec::with_capacity(points.len()),
            sides: Vec::with_capacity(points.len()),
            front: 0,
            back: 0,
        };

        for point in points {
            let dist = plane.signed_distance(*point);
            let side = PlaneSide::from_distance(dist, ON_EPSILON);
            match side {
                PlaneSide::Front => counts.front += 1,
                PlaneSide::Back => counts.back += 1,
                PlaneSide::OnPlane => {}
            }
            counts.dists.push(dist);
            counts.sides.push(side);
        }

        counts
    }
}

/// Interpolates the crossing point of edge `p1 -> p2`.
///
/// Coordinates along an axis the plane is perpendicular to are snapped to the
/// plane distance so axial cuts stay exact.
fn split_point(p1: Point3<f64>, p2: Point3<f64>, d1: f64, d2: f64, plane: &Plane3D) -> Point3<f64> {
    let t = d1 / (d1 - d2);
    let normal = plane.normal();
    let mut mid = Point3::origin();
    for j in 0..3 {
        mid[j] = if normal[j] == 1.0 {
            plane.dist()
        } else if normal[j] == -1.0 {
            -plane.dist()
        } else {
            p1[j] + t * (p2[j] - p1[j])
        };
    }
    mid
}
