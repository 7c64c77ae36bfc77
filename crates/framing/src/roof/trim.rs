//! Fascia, rake boards and ridge cap around the roof cover.
//!
//! Trim boards run around the cover edge with the outside of the roof on
//! their right. Their anchor lines sit one board thickness outside the
//! cover, at the elevation of the cover top, so each board hangs from the
//! top edge and covers the slab edge from outside.

use canopy_kernel::geometry::plane::Plane;
use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::slope::{upward_normal, RoofShape, RoofSlopeGeometry};
use super::RoofingMaterial;
use crate::board::MiteredBoard;
use crate::types::{Piece, Role};

/// Cross-section of the trim boards and the ridge cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimProfile {
    /// Board height, hanging down from the cover top.
    pub width: f64,
    pub thickness: f64,
    /// Ridge-cap wing length down each slope.
    pub wing: f64,
    /// Height of the ridge cap above the cover top.
    pub lift: f64,
    /// Ridge-cap sheet thickness.
    pub sheet: f64,
}

impl TrimProfile {
    pub fn for_material(material: RoofingMaterial) -> Option<Self> {
        let (width, thickness) = match material {
            RoofingMaterial::MetalTile | RoofingMaterial::ProfiledSheet => (0.15, 0.02),
            RoofingMaterial::Shingle => (0.18, 0.025),
            RoofingMaterial::Polycarbonate => (0.12, 0.015),
            RoofingMaterial::NoRoofing => return None,
        };
        Some(Self {
            width,
            thickness,
            wing: 0.15,
            lift: 0.03,
            sheet: 0.003,
        })
    }
}

/// A straight trim run between two anchors.
struct Run {
    start: Point3d,
    end: Point3d,
    up: Vec3,
    role: Role,
}

impl Run {
    fn direction(&self) -> Vec3 {
        (self.end - self.start).normalized_or(Vec3::X)
    }
}

/// Plane through `corner` bisecting the turn from `d_in` to `d_out`.
fn corner_plane(corner: Point3d, d_in: Vec3, d_out: Vec3) -> Plane {
    Plane::new(corner, d_in + d_out)
}

pub fn trim_pieces(cover: &RoofSlopeGeometry, profile: &TrimProfile) -> Vec<Piece> {
    let pieces = match cover.shape {
        RoofShape::Gable => gable_trim(cover, profile),
        RoofShape::SingleSlope => single_slope_trim(cover, profile),
    };
    debug!(shape = ?cover.shape, pieces = pieces.len(), "roof trim");
    pieces
}

fn gable_trim(cover: &RoofSlopeGeometry, profile: &TrimProfile) -> Vec<Piece> {
    let t = profile.thickness;
    let (hw_c, hl_c) = (cover.half_covering_span(), cover.half_covering_length());
    let (hw, hl) = (hw_c + t, hl_c + t);
    let anchor = |x: f64, z: f64| Point3d::new(x, cover.top_elevation(x), z);

    let lb = anchor(-hw, -hl);
    let lf = anchor(-hw, hl);
    let ridge_f = anchor(0.0, hl);
    let rf = anchor(hw, hl);
    let rb = anchor(hw, -hl);
    let ridge_b = anchor(0.0, -hl);

    let normal_left = upward_normal(ridge_f - lf);
    let normal_right = upward_normal(rf - ridge_f);

    // Closed loop, outside on the right.
    let runs = [
        Run { start: lb, end: lf, up: Vec3::Y, role: Role::Fascia },
        Run { start: lf, end: ridge_f, up: normal_left, role: Role::Rake },
        Run { start: ridge_f, end: rf, up: normal_right, role: Role::Rake },
        Run { start: rf, end: rb, up: Vec3::Y, role: Role::Fascia },
        Run { start: rb, end: ridge_b, up: normal_right, role: Role::Rake },
        Run { start: ridge_b, end: lb, up: normal_left, role: Role::Rake },
    ];
    let is_apex = |p: &Point3d| p.x == 0.0;

    let n = runs.len();
    let mut pieces: Vec<Piece> = (0..n)
        .map(|k| {
            let run = &runs[k];
            let prev = &runs[(k + n - 1) % n];
            let next = &runs[(k + 1) % n];
            let start_plane = if is_apex(&run.start) {
                Plane::plumb(run.start, run.direction())
            } else {
                corner_plane(run.start, prev.direction(), run.direction())
            };
            let end_plane = if is_apex(&run.end) {
                Plane::plumb(run.end, run.direction())
            } else {
                corner_plane(run.end, run.direction(), next.direction())
            };
            let board = MiteredBoard::rectangular(
                run.start,
                run.end,
                run.up,
                profile.width,
                t,
                start_plane,
                end_plane,
            );
            Piece::new(run.role, board.corners())
        })
        .collect();

    pieces.extend(ridge_cap(cover, profile, normal_left, normal_right));
    pieces
}

/// Two thin wings over the ridge, lifted above the cover top and cut flush
/// with the gable ends.
fn ridge_cap(
    cover: &RoofSlopeGeometry,
    profile: &TrimProfile,
    normal_left: Vec3,
    normal_right: Vec3,
) -> Vec<Piece> {
    let hl_c = cover.half_covering_length();
    let lift = Vec3::Y * profile.lift;
    let ridge_y = cover.top_elevation(0.0);
    let pa = Point3d::new(0.0, ridge_y, -hl_c) + lift;
    let pb = Point3d::new(0.0, ridge_y, hl_c) + lift;
    let back = Plane::new(Point3d::new(0.0, 0.0, -hl_c), Vec3::Z);
    let front = Plane::new(Point3d::new(0.0, 0.0, hl_c), Vec3::Z);

    let hw = cover.params.span_width / 2.0;
    let rise = cover.params.rise + cover.params.ridge_lift;
    [(-1.0, normal_left), (1.0, normal_right)]
        .into_iter()
        .map(|(sign, normal)| {
            let wing = Vec3::new(sign * hw, -rise, 0.0).normalized_or(Vec3::new(sign, 0.0, 0.0))
                * profile.wing;
            let below = normal * profile.sheet;
            let offsets = [Vec3::ZERO, wing, wing - below, -below];
            let board = MiteredBoard::with_offsets(pa, pb, offsets, back, front);
            Piece::new(Role::RidgeCap, board.corners())
        })
        .collect()
}

fn single_slope_trim(cover: &RoofSlopeGeometry, profile: &TrimProfile) -> Vec<Piece> {
    let t = profile.thickness;
    let (hw_c, hl_c) = (cover.half_covering_span(), cover.half_covering_length());
    let hl = hl_c + t;
    let (x_low, x_high) = (-hw_c - t, hw_c + t);
    let anchor = |x: f64, z: f64| Point3d::new(x, cover.top_elevation(x), z);

    let square = |start: Point3d, end: Point3d, up: Vec3, role: Role| {
        let (sp, ep) = MiteredBoard::square_planes(start, end);
        let board = MiteredBoard::rectangular(start, end, up, profile.width, t, sp, ep);
        Piece::new(role, board.corners())
    };
    let plumb = |start: Point3d, end: Point3d, role: Role| {
        let up = upward_normal(end - start);
        let board = MiteredBoard::rectangular(
            start,
            end,
            up,
            profile.width,
            t,
            Plane::plumb(start, end - start),
            Plane::plumb(end, end - start),
        );
        Piece::new(role, board.corners())
    };

    vec![
        square(anchor(x_low, -hl), anchor(x_low, hl), Vec3::Y, Role::Fascia),
        square(anchor(x_high, hl), anchor(x_high, -hl), Vec3::Y, Role::Fascia),
        plumb(anchor(x_low + t, hl), anchor(x_high - t, hl), Role::Rake),
        plumb(anchor(x_high - t, -hl), anchor(x_low + t, -hl), Role::Rake),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roof::slope::RoofSurfaceParams;
    use approx::assert_relative_eq;
    use canopy_kernel::topology::brep::{audit_solid, EntityStore};

    fn cover(shape: RoofShape) -> RoofSlopeGeometry {
        RoofSlopeGeometry::new(
            shape,
            RoofSurfaceParams {
                span_width: 6.0,
                length_along_ridge: 5.0,
                base_height: 3.0,
                rise: 1.0,
                overhang: 0.1,
                thickness: 0.001,
                ..RoofSurfaceParams::default()
            },
        )
    }

    fn profile() -> TrimProfile {
        TrimProfile::for_material(RoofingMaterial::MetalTile).unwrap()
    }

    #[test]
    fn test_profiles_by_material() {
        assert!(TrimProfile::for_material(RoofingMaterial::NoRoofing).is_none());
        let shingle = TrimProfile::for_material(RoofingMaterial::Shingle).unwrap();
        assert_relative_eq!(shingle.width, 0.18);
        assert_relative_eq!(shingle.thickness, 0.025);
    }

    #[test]
    fn test_gable_trim_pieces_are_closed_solids() {
        let pieces = trim_pieces(&cover(RoofShape::Gable), &profile());
        assert_eq!(pieces.len(), 8);
        let mut store = EntityStore::new();
        for piece in &pieces {
            let tagged = piece.build(&mut store);
            let audit = audit_solid(&store, tagged.solid);
            assert!(audit.all_valid(), "{:?}: {:?}", piece.role, audit.errors);
            assert!(store.solid_volume(tagged.solid) > 0.0);
        }
    }

    #[test]
    fn test_gable_corner_miters_meet() {
        let pieces = trim_pieces(&cover(RoofShape::Gable), &profile());
        // Fascia LB→LF ends where the front-left rake starts, both cut by
        // the bisector plane of the corner.
        let fascia = &pieces[0].corners;
        let rake = &pieces[1].corners;
        assert_relative_eq!(fascia[4], rake[0], epsilon = 1e-9);

        let d_in = (fascia[4] - fascia[0]).normalized().unwrap();
        let d_out = (rake[4] - rake[0]).normalized().unwrap();
        let bisector = Plane::new(fascia[4], d_in + d_out);
        for p in fascia[4..].iter().chain(&rake[..4]) {
            assert!(bisector.signed_distance(p).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rake_boards_meet_on_apex_plane() {
        let pieces = trim_pieces(&cover(RoofShape::Gable), &profile());
        for corner in pieces[1].corners[4..].iter().chain(&pieces[2].corners[..4]) {
            assert!(corner.x.abs() < 1e-9);
        }
    }

    #[test]
    fn test_ridge_cap_is_flush_with_gable_ends() {
        let c = cover(RoofShape::Gable);
        let pieces = trim_pieces(&c, &profile());
        let hl_c = c.half_covering_length();
        for cap in pieces.iter().filter(|p| p.role == Role::RidgeCap) {
            for p in &cap.corners[..4] {
                assert_relative_eq!(p.z, -hl_c, epsilon = 1e-12);
            }
            for p in &cap.corners[4..] {
                assert_relative_eq!(p.z, hl_c, epsilon = 1e-12);
            }
            // Lifted above the cover ridge.
            assert!(cap.corners[0].y > c.top_elevation(0.0));
        }
    }

    #[test]
    fn test_single_slope_trim_layout() {
        let c = cover(RoofShape::SingleSlope);
        let pieces = trim_pieces(&c, &profile());
        assert_eq!(pieces.len(), 4);
        assert_eq!(pieces.iter().filter(|p| p.role == Role::Fascia).count(), 2);
        let hw_c = c.half_covering_span();
        // Rake ends are plumb cuts at the cover edges.
        for rake in pieces.iter().filter(|p| p.role == Role::Rake) {
            let xs: Vec<f64> = rake.corners.iter().map(|p| p.x.abs()).collect();
            assert!(xs.iter().all(|x| (x - hw_c).abs() < 1e-9));
        }
        let mut store = EntityStore::new();
        for piece in &pieces {
            let tagged = piece.build(&mut store);
            assert!(audit_solid(&store, tagged.solid).all_valid());
        }
    }

    #[test]
    fn test_fascia_sits_outside_cover() {
        let c = cover(RoofShape::SingleSlope);
        let pieces = trim_pieces(&c, &profile());
        let hw_c = c.half_covering_span();
        let low = &pieces[0];
        let max_x = low.corners.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let min_x = low.corners.iter().map(|p| p.x).fold(f64::MAX, f64::min);
        assert_relative_eq!(max_x, -hw_c, epsilon = 1e-12);
        assert_relative_eq!(min_x, -hw_c - 0.02, epsilon = 1e-12);
    }
}
