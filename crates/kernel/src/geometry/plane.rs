use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// Denominator below which a line is treated as parallel to a plane.
pub const PARALLEL_EPSILON: f64 = 1e-9;

/// An infinite plane through `point` with unit `normal`.
///
/// Used as a cutting plane for mitered ends and as the carrier surface of
/// planar B-rep faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Point3d,
    pub normal: Vec3,
}

impl Plane {
    /// Zero-length normals fall back to +Y.
    pub fn new(point: Point3d, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalized_or(Vec3::Y),
        }
    }

    /// Plane through `point` perpendicular to the horizontal component of
    /// `direction`. Plumb (vertical) cut.
    pub fn plumb(point: Point3d, direction: Vec3) -> Self {
        Self::new(point, Vec3::new(direction.x, 0.0, direction.z))
    }

    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        (*p - self.point).dot(&self.normal)
    }

    /// Intersection of the line `origin + t·direction` with this plane.
    ///
    /// `None` when the line is parallel to the plane.
    pub fn intersect_line(&self, origin: &Point3d, direction: &Vec3) -> Option<Point3d> {
        let denom = direction.dot(&self.normal);
        if denom.abs() <= PARALLEL_EPSILON {
            return None;
        }
        let t = (self.point - *origin).dot(&self.normal) / denom;
        Some(*origin + *direction * t)
    }

    /// Cut the line through `origin` at this plane, or keep `origin` uncut
    /// when the line runs parallel to it.
    pub fn cut(&self, origin: &Point3d, direction: &Vec3) -> Point3d {
        self.intersect_line(origin, direction).unwrap_or(*origin)
    }
}
