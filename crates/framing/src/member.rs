//! Oriented prismatic solids for trimmed members.

use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::transform::Transform;
use canopy_kernel::geometry::vector::Vec3;
use canopy_kernel::topology::brep::{EntityStore, SolidId};
use canopy_kernel::topology::primitives::make_hexahedron;
use tracing::{debug, instrument};

use crate::types::{Corners, Member, Section};

/// Members shorter than this after trimming produce no solid.
pub const MIN_MEMBER_LENGTH: f64 = 0.01;

/// Placement of a member's local box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberFrame {
    /// Maps local X onto the member axis and the local origin onto the
    /// midpoint of the trimmed axis.
    pub transform: Transform,
    /// Effective length after trims.
    pub length: f64,
}

/// Frame of `member`, or `None` when its trimmed length is below
/// [`MIN_MEMBER_LENGTH`] or its axis has no direction.
pub fn member_frame(member: &Member) -> Option<MemberFrame> {
    let length = member.effective_length();
    if !length.is_finite() || length < MIN_MEMBER_LENGTH {
        return None;
    }
    let dir = member.direction()?;
    let start = member.start + dir * member.start_trim;
    let end = member.end - dir * member.end_trim;
    let center = start.midpoint(&end);
    let transform = Transform::from_rotation_between(Vec3::X, dir).with_translation(center.to_vec3());
    Some(MemberFrame { transform, length })
}

/// Corners of the local box for a member of `length` and `section`: X along
/// the axis and centered, Y from `-height` up to the axis, Z centered on the
/// width.
pub fn local_corners(length: f64, section: Section) -> Corners {
    let (hx, hz) = (length / 2.0, section.width / 2.0);
    let h = section.height;
    [
        Point3d::new(-hx, -h, -hz),
        Point3d::new(-hx, 0.0, -hz),
        Point3d::new(-hx, 0.0, hz),
        Point3d::new(-hx, -h, hz),
        Point3d::new(hx, -h, -hz),
        Point3d::new(hx, 0.0, -hz),
        Point3d::new(hx, 0.0, hz),
        Point3d::new(hx, -h, hz),
    ]
}

/// World-space corners of the member's solid without touching an arena.
pub fn member_corners(member: &Member) -> Option<Corners> {
    let frame = member_frame(member)?;
    Some(local_corners(frame.length, member.section).map(|p| frame.transform.transform_point(&p)))
}

/// Add the member's solid to `store`. Members too short after trimming are a
/// no-op.
#[instrument(skip(store, member), fields(role = ?member.role))]
pub fn build_member(store: &mut EntityStore, member: &Member) -> Option<SolidId> {
    let Some(corners) = member_corners(member) else {
        debug!(length = member.effective_length(), "member skipped");
        return None;
    };
    Some(make_hexahedron(store, corners))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberRole;
    use approx::assert_relative_eq;
    use canopy_kernel::topology::brep::audit_solid;

    fn chord(start: Point3d, end: Point3d) -> Member {
        Member::new(start, end, Section::TRUSS_DEFAULT, MemberRole::Chord)
    }

    #[test]
    fn test_horizontal_member_hangs_below_axis() {
        let m = chord(Point3d::new(0.0, 2.0, 0.0), Point3d::new(3.0, 2.0, 0.0));
        let mut store = EntityStore::new();
        let solid = build_member(&mut store, &m).unwrap();
        let bb = store.solid_bounding_box(solid);
        assert_relative_eq!(bb.min.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bb.min.y, 2.0 - 0.19, epsilon = 1e-12);
        assert_relative_eq!(bb.max.z - bb.min.z, 0.045, epsilon = 1e-12);
        assert_relative_eq!(store.solid_volume(solid), 3.0 * 0.19 * 0.045, epsilon = 1e-12);
        assert!(audit_solid(&store, solid).all_valid());
    }

    #[test]
    fn test_trims_shorten_from_each_end() {
        let m = chord(Point3d::ORIGIN, Point3d::new(2.0, 0.0, 0.0)).with_trims(0.25, 0.5);
        let frame = member_frame(&m).unwrap();
        assert_relative_eq!(frame.length, 1.25, epsilon = 1e-12);
        let c = frame.transform.translation_part();
        assert_relative_eq!(c.x, 0.25 + 1.25 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_short_member_is_noop() {
        let m = chord(Point3d::ORIGIN, Point3d::new(0.2, 0.0, 0.0)).with_trims(0.1, 0.095);
        let mut store = EntityStore::new();
        assert!(build_member(&mut store, &m).is_none());
        assert_eq!(store.solids.len(), 0);
        assert!(member_corners(&chord(Point3d::ORIGIN, Point3d::ORIGIN)).is_none());
    }

    #[test]
    fn test_sloped_member_corners_follow_axis() {
        let m = chord(Point3d::ORIGIN, Point3d::new(3.0, 1.0, 0.0));
        let corners = member_corners(&m).unwrap();
        let axis = (m.end - m.start).normalized().unwrap();
        // Long edges run parallel to the axis with the full length.
        for i in 0..4 {
            let edge = corners[i + 4] - corners[i];
            assert_relative_eq!(edge.length(), m.axis_length(), epsilon = 1e-9);
            assert!(edge.cross(&axis).length() < 1e-9);
        }
        // The section depth hangs away from +Y.
        let depth = corners[0] - corners[1];
        assert!(depth.y < 0.0);
        assert_relative_eq!(depth.length(), 0.19, epsilon = 1e-12);
    }

    #[test]
    fn test_member_against_x_keeps_up() {
        let m = chord(Point3d::new(1.0, 0.0, 0.0), Point3d::ORIGIN);
        let corners = member_corners(&m).unwrap();
        let max_y = corners.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert_relative_eq!(max_y, 0.0, epsilon = 1e-12);
    }
}
