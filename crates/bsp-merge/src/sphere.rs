//! Bounding spheres cached on faces.

use nalgebra::Point3;

/// A sphere enclosing every point of a winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Centers the sphere on the vertex mean and grows it to the farthest vertex.
    ///
    /// An empty point set yields a zero sphere at the origin.
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        if points.is_empty() {
            return Self::new(Point3::origin(), 0.0);
        }

        let sum: nalgebra::Vector3<f64> = points.iter().map(|p| p.coords).sum();
        let center = Point3::from(sum / points.len() as f64);
        let radius_squared = points
            .iter()
            .map(|p| (p - center).norm_squared())
            .fold(0.0, f64::max);

        Self::new(center, radius_squared.sqrt())
    }
}
