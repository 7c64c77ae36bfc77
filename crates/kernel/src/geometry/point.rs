use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::vector::Vec3;

/// A location in model space (meters, Y-up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
            z: (self.z + other.z) * 0.5,
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.to_vec3().is_finite()
    }
}

impl Add<Vec3> for Point3d {
    type Output = Point3d;
    fn add(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3d {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub<Vec3> for Point3d {
    type Output = Point3d;
    fn sub(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AbsDiffEq for Point3d {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.to_vec3().abs_diff_eq(&other.to_vec3(), epsilon)
    }
}

impl RelativeEq for Point3d {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.to_vec3()
            .relative_eq(&other.to_vec3(), epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_point_distance() {
        let a = Point3d::new(1.0, 0.0, 0.0);
        let b = Point3d::new(4.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_midpoint() {
        let a = Point3d::ORIGIN;
        let b = Point3d::new(2.0, 4.0, 6.0);
        assert_abs_diff_eq!(a.midpoint(&b), Point3d::new(1.0, 2.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_point_vector_arithmetic() {
        let p = Point3d::new(1.0, 2.0, 3.0);
        let v = Vec3::new(10.0, 20.0, 30.0);
        assert_abs_diff_eq!((p + v) - p, v, epsilon = 1e-12);
        assert_abs_diff_eq!((p + v) - v, p, epsilon = 1e-12);
    }
}
