//! Miter trims at the joints of member chains.
//!
//! Two members meeting at a joint with turning angle φ between their
//! directions are each shortened by `s = (b/2) / tan(φ/2)` along their own
//! axis, where `b` is the in-plane depth of the section. The pair of trimmed
//! ends then meets on the bisector of the joint.

use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::types::{Member, MemberRole, Section};

/// Below this |tan(φ/2)| a joint is treated as collinear.
const TAN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiterConfig {
    /// Upper bound on a trim as a fraction of the shorter adjoining member.
    pub max_trim_fraction: f64,
    /// Turning angles within this of 0 or π (radians) get no trim.
    pub collinear_epsilon: f64,
}

impl Default for MiterConfig {
    fn default() -> Self {
        Self {
            max_trim_fraction: 0.45,
            collinear_epsilon: 1e-3,
        }
    }
}

/// Trim shared by the incoming and outgoing member at one joint.
///
/// `incoming` and `outgoing` are the segment vectors (not necessarily unit);
/// `len_in` and `len_out` are the untrimmed segment lengths used for the
/// clamp. The result is always finite and non-negative.
pub fn miter_trim(
    incoming: Vec3,
    outgoing: Vec3,
    depth: f64,
    len_in: f64,
    len_out: f64,
    config: &MiterConfig,
) -> f64 {
    let (Some(u_in), Some(u_out)) = (incoming.normalized(), outgoing.normalized()) else {
        return 0.0;
    };
    let phi = u_in.dot(&u_out).clamp(-1.0, 1.0).acos();
    let eps = config.collinear_epsilon;
    if !phi.is_finite() || phi < eps || (std::f64::consts::PI - phi).abs() < eps {
        return 0.0;
    }
    let tan_half = (phi / 2.0).tan();
    if !tan_half.is_finite() || tan_half.abs() < TAN_EPSILON {
        return 0.0;
    }

    let raw = (depth / 2.0) / tan_half;
    let limit = config.max_trim_fraction * len_in.min(len_out);
    let trim = raw.min(limit).max(0.0);
    if trim.is_finite() { trim } else { 0.0 }
}

/// Trims for every interior joint of a polyline.
///
/// Joint `k` lies between segment `k` and `k + 1`, so the result has
/// `points.len() - 2` entries (empty for fewer than three points). Joints
/// listed in `skip` get a zero trim. All trims are computed from the
/// untrimmed segment lengths.
pub fn miter_chain(points: &[Point3d], depth: f64, skip: &[usize], config: &MiterConfig) -> Vec<f64> {
    if points.len() < 3 {
        return Vec::new();
    }
    let segments: Vec<Vec3> = points.windows(2).map(|w| w[1] - w[0]).collect();
    segments
        .windows(2)
        .enumerate()
        .map(|(k, pair)| {
            if skip.contains(&k) {
                return 0.0;
            }
            miter_trim(pair[0], pair[1], depth, pair[0].length(), pair[1].length(), config)
        })
        .collect()
}

/// Members along a polyline with miter trims applied at its joints.
///
/// The first member's start and the last member's end stay untrimmed.
#[instrument(skip(points, skip, config), fields(points = points.len()))]
pub fn mitered_chain(
    points: &[Point3d],
    section: Section,
    role: MemberRole,
    skip: &[usize],
    config: &MiterConfig,
) -> Vec<Member> {
    let trims = miter_chain(points, section.height, skip, config);
    let members: Vec<Member> = points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let start_trim = if i == 0 { 0.0 } else { trims[i - 1] };
            let end_trim = trims.get(i).copied().unwrap_or(0.0);
            Member::new(w[0], w[1], section, role).with_trims(start_trim, end_trim)
        })
        .collect();
    debug!(?trims, "mitered chain");
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> MiterConfig {
        MiterConfig::default()
    }

    #[test]
    fn test_right_angle_trim_is_half_depth() {
        let s = miter_trim(Vec3::X, Vec3::Y, 0.19, 2.0, 2.0, &cfg());
        assert_relative_eq!(s, 0.095, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_and_reversal_have_no_trim() {
        assert_eq!(miter_trim(Vec3::X, Vec3::X, 0.19, 1.0, 1.0, &cfg()), 0.0);
        assert_eq!(miter_trim(Vec3::X, -Vec3::X, 0.19, 1.0, 1.0, &cfg()), 0.0);
        let nearly = Vec3::new(1.0, 1e-5, 0.0);
        assert_eq!(miter_trim(Vec3::X, nearly, 0.19, 1.0, 1.0, &cfg()), 0.0);
    }

    #[test]
    fn test_degenerate_segments_have_no_trim() {
        assert_eq!(miter_trim(Vec3::ZERO, Vec3::Y, 0.19, 0.0, 1.0, &cfg()), 0.0);
        let nan = Vec3::new(f64::NAN, 0.0, 0.0);
        assert_eq!(miter_trim(nan, Vec3::Y, 0.19, 1.0, 1.0, &cfg()), 0.0);
    }

    #[test]
    fn test_shallow_joint_is_clamped() {
        // A shallow turn of 0.01 rad: the raw trim is about 19 m.
        let shallow = Vec3::new(1.0, 0.01, 0.0);
        let s = miter_trim(Vec3::X, shallow, 0.19, 0.5, 0.3, &cfg());
        assert_relative_eq!(s, 0.45 * 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp_fraction_is_configurable() {
        let config = MiterConfig {
            max_trim_fraction: 0.1,
            ..MiterConfig::default()
        };
        let s = miter_trim(Vec3::X, Vec3::Y, 0.19, 0.5, 0.5, &config);
        assert_relative_eq!(s, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_chain_skip_list() {
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.5, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
            Point3d::new(3.0, 0.5, 0.0),
        ];
        let trims = miter_chain(&pts, 0.19, &[0], &cfg());
        assert_eq!(trims.len(), 2);
        assert_eq!(trims[0], 0.0);
        assert!(trims[1] > 0.0);
    }

    #[test]
    fn test_chain_uses_untrimmed_lengths() {
        // The middle segment is short; both of its joints clamp against the
        // same untrimmed length rather than a length reduced by the first trim.
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 0.1, 0.0),
            Point3d::new(2.0, 0.1, 0.0),
        ];
        let trims = miter_chain(&pts, 0.19, &[], &cfg());
        assert_relative_eq!(trims[0], 0.045, epsilon = 1e-12);
        assert_relative_eq!(trims[1], 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_mitered_chain_members() {
        let pts = [
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
        ];
        let members = mitered_chain(&pts, Section::TRUSS_DEFAULT, MemberRole::Chord, &[], &cfg());
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].start_trim, 0.0);
        assert_relative_eq!(members[0].end_trim, 0.095, epsilon = 1e-12);
        assert_relative_eq!(members[1].start_trim, 0.095, epsilon = 1e-12);
        assert_eq!(members[1].end_trim, 0.0);
    }

    #[test]
    fn test_short_chains() {
        assert!(miter_chain(&[Point3d::ORIGIN], 0.19, &[], &cfg()).is_empty());
        let members = mitered_chain(
            &[Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0)],
            Section::TRUSS_DEFAULT,
            MemberRole::Chord,
            &[],
            &cfg(),
        );
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].effective_length(), 1.0);
    }
}
