use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A 4x4 affine transformation matrix stored in column-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            dx,  dy,  dz,  1.0,
        ];
        Self { m }
    }

    /// Shortest-arc rotation taking direction `from` onto direction `to`.
    ///
    /// Antiparallel inputs have no unique shortest arc; they resolve to a
    /// half turn about the component of world Y perpendicular to `from`
    /// (world X when `from` is vertical), so a member laid along -X keeps
    /// its local Y pointing up.
    pub fn from_rotation_between(from: Vec3, to: Vec3) -> Self {
        let a: Vector3<f64> = from.normalized_or(Vec3::X).into();
        let b: Vector3<f64> = to.normalized_or(Vec3::X).into();

        let q = UnitQuaternion::rotation_between(&a, &b).unwrap_or_else(|| {
            let up = Vector3::y();
            let perp = up - a * a.dot(&up);
            let axis = Unit::try_new(perp, 1e-9).unwrap_or_else(Vector3::<f64>::x_axis);
            UnitQuaternion::from_axis_angle(&axis, std::f64::consts::PI)
        });

        let r = q.to_rotation_matrix();
        let mut t = Self::identity();
        for col in 0..3 {
            for row in 0..3 {
                t.m[col * 4 + row] = r[(row, col)];
            }
        }
        t
    }

    /// Same linear part, translation replaced by `v`.
    pub fn with_translation(mut self, v: Vec3) -> Self {
        self.m[12] = v.x;
        self.m[13] = v.y;
        self.m[14] = v.z;
        self
    }

    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m[12], self.m[13], self.m[14])
    }

    /// Matrix element access (row, col), 0-indexed.
    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// Transform a point (applies translation).
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let x = self.at(0, 0) * p.x + self.at(0, 1) * p.y + self.at(0, 2) * p.z + self.at(0, 3);
        let y = self.at(1, 0) * p.x + self.at(1, 1) * p.y + self.at(1, 2) * p.z + self.at(1, 3);
        let z = self.at(2, 0) * p.x + self.at(2, 1) * p.y + self.at(2, 2) * p.z + self.at(2, 3);
        Point3d::new(x, y, z)
    }

    /// Transform a vector (no translation).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let x = self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z;
        let y = self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z;
        let z = self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z;
        Vec3::new(x, y, z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3d,
    pub max: Point3d,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point3d::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3d::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: &[Point3d]) -> Self {
        let mut bb = Self::empty();
        for p in points {
            bb.expand_to_include(p);
        }
        bb
    }

    pub fn expand_to_include(&mut self, p: &Point3d) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn center(&self) -> Point3d {
        self.min.midpoint(&self.max)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
