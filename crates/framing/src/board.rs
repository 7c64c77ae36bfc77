//! Boards whose ends are cut by arbitrary planes.
//!
//! A board runs from anchor `A` to anchor `B`. Its cross-section is a quad
//! of four offsets from the running line; each offset line is cut by the
//! start plane and the end plane, giving the eight corners of a closed
//! hexahedron.

use canopy_kernel::geometry::plane::Plane;
use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use canopy_kernel::topology::brep::{EntityStore, SolidId};
use canopy_kernel::topology::primitives::make_hexahedron;

use crate::types::Corners;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiteredBoard {
    pub start: Point3d,
    pub end: Point3d,
    /// Cross-section corners relative to the running line.
    pub offsets: [Vec3; 4],
    pub start_plane: Plane,
    pub end_plane: Plane,
}

impl MiteredBoard {
    /// Rectangular board hanging from the running line.
    ///
    /// With `fwd` the running direction, `right = fwd × up` and
    /// `local_up = right × fwd`, the section spans `thickness` to the left
    /// of the line and `width` below it.
    pub fn rectangular(
        start: Point3d,
        end: Point3d,
        up: Vec3,
        width: f64,
        thickness: f64,
        start_plane: Plane,
        end_plane: Plane,
    ) -> Self {
        let fwd = (end - start).normalized_or(Vec3::X);
        let right = fwd.cross(&up).normalized_or(Vec3::Z);
        let local_up = right.cross(&fwd);
        let offsets = [
            Vec3::ZERO,
            -right * thickness,
            -right * thickness - local_up * width,
            -local_up * width,
        ];
        Self::with_offsets(start, end, offsets, start_plane, end_plane)
    }

    pub fn with_offsets(
        start: Point3d,
        end: Point3d,
        offsets: [Vec3; 4],
        start_plane: Plane,
        end_plane: Plane,
    ) -> Self {
        Self {
            start,
            end,
            offsets,
            start_plane,
            end_plane,
        }
    }

    /// Square-cut planes through both anchors, perpendicular to the run.
    pub fn square_planes(start: Point3d, end: Point3d) -> (Plane, Plane) {
        let fwd = (end - start).normalized_or(Vec3::X);
        (Plane::new(start, fwd), Plane::new(end, fwd))
    }

    /// Unit running direction.
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalized_or(Vec3::X)
    }

    /// Eight corners: the start ring, then the end ring. An offset line
    /// parallel to its cut plane keeps its uncut anchor point.
    pub fn corners(&self) -> Corners {
        let fwd = self.direction();
        let mut corners = [Point3d::ORIGIN; 8];
        for (i, offset) in self.offsets.iter().enumerate() {
            let a = self.start + *offset;
            let b = self.end + *offset;
            corners[i] = self.start_plane.cut(&a, &fwd);
            corners[i + 4] = self.end_plane.cut(&b, &fwd);
        }
        corners
    }

    pub fn build(&self, store: &mut EntityStore) -> SolidId {
        make_hexahedron(store, self.corners())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use canopy_kernel::topology::brep::audit_solid;

    #[test]
    fn test_square_board_volume() {
        let a = Point3d::ORIGIN;
        let b = Point3d::new(0.0, 0.0, 2.0);
        let (sp, ep) = MiteredBoard::square_planes(a, b);
        let board = MiteredBoard::rectangular(a, b, Vec3::Y, 0.15, 0.02, sp, ep);
        let mut store = EntityStore::new();
        let solid = board.build(&mut store);
        assert_relative_eq!(store.solid_volume(solid), 2.0 * 0.15 * 0.02, epsilon = 1e-12);
        let bb = store.solid_bounding_box(solid);
        assert_relative_eq!(bb.max.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.min.y, -0.15, epsilon = 1e-12);
        // fwd = +Z, right = Z × Y = -X, so the thickness lies toward +X.
        assert_relative_eq!(bb.min.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.x, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_mitered_corner_meets_neighbor() {
        // Two boards around a right-angled corner at the origin, sharing the
        // bisector plane.
        let corner = Point3d::ORIGIN;
        let d_in = Vec3::X;
        let d_out = Vec3::Z;
        let bisector = Plane::new(corner, d_in + d_out);
        let a = Point3d::new(-2.0, 0.0, 0.0);
        let c = Point3d::new(0.0, 0.0, 2.0);
        let first = MiteredBoard::rectangular(a, corner, Vec3::Y, 0.15, 0.02, Plane::new(a, d_in), bisector);
        let second = MiteredBoard::rectangular(corner, c, Vec3::Y, 0.15, 0.02, bisector, Plane::new(c, d_out));

        let (first_corners, second_corners) = (first.corners(), second.corners());
        for p in first_corners[4..].iter().chain(&second_corners[..4]) {
            assert!(bisector.signed_distance(p).abs() < 1e-12);
        }
        let mut store = EntityStore::new();
        for board in [first, second] {
            let solid = board.build(&mut store);
            assert!(audit_solid(&store, solid).all_valid());
        }
    }

    #[test]
    fn test_parallel_cut_keeps_anchor() {
        let a = Point3d::ORIGIN;
        let b = Point3d::new(1.0, 0.0, 0.0);
        let parallel = Plane::new(Point3d::new(0.0, 5.0, 0.0), Vec3::Y);
        let (sp, _) = MiteredBoard::square_planes(a, b);
        let board = MiteredBoard::rectangular(a, b, Vec3::Y, 0.1, 0.1, sp, parallel);
        let corners = board.corners();
        assert_relative_eq!(corners[4], b, epsilon = 1e-12);
    }
}
