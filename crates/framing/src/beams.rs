//! Longitudinal beams on the post heads and knee braces under them.

use canopy_kernel::geometry::point::Point3d;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::posts::PostVariant;
use crate::types::{Member, MemberRole, Piece, Role, Section};

/// Beam section used with cluster and plain posts.
pub const HEAVY_BEAM: Section = Section::new(0.2, 0.2);

/// Procedural brace section when no external mesh is supplied.
pub const BRACE_SECTION: Section = Section::new(0.04, 0.06);

/// Distance from the post axis to the foot of a brace, along the ridge.
const BRACE_FOOT_OFFSET: f64 = 0.075;

/// Beam section for posts of `variant` with shaft `post`.
pub fn beam_section(variant: PostVariant, post: Section) -> Section {
    match variant {
        PostVariant::Cluster | PostVariant::Plain => HEAVY_BEAM,
        _ => post,
    }
}

/// Footprint of the two beams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamRun {
    /// Post-to-post width; beams sit on `x = ±width/2`.
    pub width: f64,
    pub length: f64,
    /// Top of the posts, where the beams bear.
    pub eave_height: f64,
    pub front_overhang: f64,
    pub back_overhang: f64,
}

impl BeamRun {
    pub fn beam_length(&self) -> f64 {
        self.length + self.front_overhang + self.back_overhang
    }

    /// Left and right beams as boxes of `section`.
    pub fn pieces(&self, section: Section) -> Vec<Piece> {
        let z = (self.front_overhang - self.back_overhang) / 2.0;
        let y = self.eave_height + section.height / 2.0;
        let size = [section.width, section.height, self.beam_length()];
        [-self.width / 2.0, self.width / 2.0]
            .into_iter()
            .map(|x| Piece::cuboid(Role::Beam, Point3d::new(x, y, z), size))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("brace variant must be 1..=4, got {0}")]
pub struct InvalidBraceVariant(pub u8);

/// Brace designs, numbered 1..=4 in configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BraceVariant {
    Straight,
    Short,
    Curved,
    Steep,
}

impl TryFrom<u8> for BraceVariant {
    type Error = InvalidBraceVariant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BraceVariant::Straight),
            2 => Ok(BraceVariant::Short),
            3 => Ok(BraceVariant::Curved),
            4 => Ok(BraceVariant::Steep),
            other => Err(InvalidBraceVariant(other)),
        }
    }
}

impl From<BraceVariant> for u8 {
    fn from(variant: BraceVariant) -> Self {
        match variant {
            BraceVariant::Straight => 1,
            BraceVariant::Short => 2,
            BraceVariant::Curved => 3,
            BraceVariant::Steep => 4,
        }
    }
}

impl BraceVariant {
    /// Horizontal and vertical reach of the brace.
    pub fn reach(self) -> (f64, f64) {
        match self {
            BraceVariant::Straight | BraceVariant::Curved => (0.5, 0.5),
            BraceVariant::Short => (0.4, 0.4),
            BraceVariant::Steep => (0.33, 0.5),
        }
    }

    /// Key under which an external mesh for this variant is looked up.
    pub fn asset_key(self) -> String {
        format!("brace-{}", u8::from(self))
    }
}

/// Brace axes for posts at `post_zs` on both sides. Each post gets one
/// brace toward the next post and one toward the previous, rising from
/// below the beam to the beam bottom at `eave_height`.
pub fn brace_members(variant: BraceVariant, width: f64, eave_height: f64, post_zs: &[f64]) -> Vec<Member> {
    let (reach, drop) = variant.reach();
    let last = post_zs.len().saturating_sub(1);
    let mut members = Vec::new();
    for x in [-width / 2.0, width / 2.0] {
        for (i, &z) in post_zs.iter().enumerate() {
            let mut brace = |sign: f64| {
                let foot = Point3d::new(x, eave_height - drop, z + sign * BRACE_FOOT_OFFSET);
                let head = Point3d::new(x, eave_height, foot.z + sign * reach);
                members.push(Member::new(foot, head, BRACE_SECTION, MemberRole::Brace));
            };
            if i < last {
                brace(1.0);
            }
            if i > 0 {
                brace(-1.0);
            }
        }
    }
    debug!(?variant, braces = members.len(), "braces");
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use canopy_kernel::geometry::transform::BoundingBox;

    #[test]
    fn test_beam_section_by_post_variant() {
        let post = Section::new(0.12, 0.12);
        assert_eq!(beam_section(PostVariant::Plain, post), HEAVY_BEAM);
        assert_eq!(beam_section(PostVariant::Cluster, post), HEAVY_BEAM);
        assert_eq!(beam_section(PostVariant::TallBase, post), post);
    }

    #[test]
    fn test_beams_sit_on_posts() {
        let run = BeamRun {
            width: 4.0,
            length: 6.0,
            eave_height: 2.5,
            front_overhang: 0.5,
            back_overhang: 0.3,
        };
        let pieces = run.pieces(HEAVY_BEAM);
        assert_eq!(pieces.len(), 2);
        let bb = BoundingBox::from_points(&pieces[1].corners);
        assert_relative_eq!(bb.min.y, 2.5, epsilon = 1e-12);
        assert_relative_eq!(bb.max.y, 2.7, epsilon = 1e-12);
        assert_relative_eq!(bb.center().x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bb.size().z, 6.8, epsilon = 1e-12);
        assert_relative_eq!(bb.max.z, 3.5, epsilon = 1e-12);
        assert_relative_eq!(bb.min.z, -3.3, epsilon = 1e-12);
        assert!(pieces.iter().all(|p| p.role == Role::Beam));
    }

    #[test]
    fn test_brace_variant_numbers() {
        assert_eq!(BraceVariant::try_from(4), Ok(BraceVariant::Steep));
        assert_eq!(BraceVariant::try_from(5), Err(InvalidBraceVariant(5)));
        assert_eq!(BraceVariant::Short.reach(), (0.4, 0.4));
        assert_eq!(BraceVariant::Steep.reach(), (0.33, 0.5));
        let v: BraceVariant = serde_json::from_str("3").unwrap();
        assert_eq!(v, BraceVariant::Curved);
    }

    #[test]
    fn test_braces_point_toward_neighbours() {
        let zs = [-3.0, 0.0, 3.0];
        let braces = brace_members(BraceVariant::Straight, 4.0, 2.5, &zs);
        // End posts get one brace, the middle post two, on each side.
        assert_eq!(braces.len(), 8);
        let first = &braces[0];
        assert_relative_eq!(first.start.x, -2.0);
        assert_relative_eq!(first.start.y, 2.0);
        assert_relative_eq!(first.start.z, -2.925, epsilon = 1e-12);
        assert_relative_eq!(first.end.y, 2.5);
        assert_relative_eq!(first.end.z, -2.425, epsilon = 1e-12);

        let backward = &braces[2];
        assert!(backward.end.z < backward.start.z);
        assert!(braces.iter().all(|b| b.role == MemberRole::Brace));
    }

    #[test]
    fn test_single_post_has_no_braces() {
        assert!(brace_members(BraceVariant::Short, 4.0, 2.5, &[0.0]).is_empty());
        assert!(brace_members(BraceVariant::Short, 4.0, 2.5, &[]).is_empty());
    }
}
