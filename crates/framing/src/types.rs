use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use canopy_kernel::topology::brep::{EntityStore, SolidId};
use canopy_kernel::topology::primitives::make_hexahedron;
use serde::{Deserialize, Serialize};

/// Rectangular timber cross-section in meters.
///
/// `width` is the out-of-plane thickness of a member (along the local Z of a
/// truss), `height` its in-plane depth. A "45x190" truss board is
/// `Section { width: 0.045, height: 0.19 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub width: f64,
    pub height: f64,
}

impl Section {
    /// Fallback for post and beam descriptors.
    pub const POST_DEFAULT: Section = Section::new(0.15, 0.15);
    /// Fallback for truss descriptors.
    pub const TRUSS_DEFAULT: Section = Section::new(0.045, 0.19);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Structural role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    Chord,
    Web,
    /// Vertical truss post.
    Post,
    /// Knee brace between a canopy post and its beam.
    Brace,
}

/// A straight prismatic timber between two points, trimmed along its own
/// axis at each end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub start: Point3d,
    pub end: Point3d,
    pub section: Section,
    pub start_trim: f64,
    pub end_trim: f64,
    pub role: MemberRole,
}

impl Member {
    pub fn new(start: Point3d, end: Point3d, section: Section, role: MemberRole) -> Self {
        Self {
            start,
            end,
            section,
            start_trim: 0.0,
            end_trim: 0.0,
            role,
        }
    }

    pub fn with_trims(mut self, start_trim: f64, end_trim: f64) -> Self {
        self.start_trim = start_trim;
        self.end_trim = end_trim;
        self
    }

    /// Untrimmed axis length |Q − P|.
    pub fn axis_length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Length left after both trims.
    pub fn effective_length(&self) -> f64 {
        self.axis_length() - self.start_trim - self.end_trim
    }

    /// Unit axis direction, `None` for a zero-length member.
    pub fn direction(&self) -> Option<Vec3> {
        (self.end - self.start).normalized()
    }
}

/// Material-assignment tag carried by every emitted solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Post,
    PostBase,
    Beam,
    Brace,
    TrussChord,
    TrussWeb,
    TrussPost,
    Substructure,
    RoofCover,
    RoofFlatZone,
    Fascia,
    Rake,
    RidgeCap,
}

impl From<MemberRole> for Role {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Chord => Role::TrussChord,
            MemberRole::Web => Role::TrussWeb,
            MemberRole::Post => Role::TrussPost,
            MemberRole::Brace => Role::Brace,
        }
    }
}

/// A solid in an [`EntityStore`](canopy_kernel::topology::brep::EntityStore)
/// together with its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedSolid {
    pub role: Role,
    pub solid: SolidId,
}

/// Eight corners of a closed six-faced solid, as two rings of four.
pub type Corners = [Point3d; 8];

/// A hexahedral piece of geometry not yet placed in an entity store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub role: Role,
    pub corners: Corners,
}

impl Piece {
    pub fn new(role: Role, corners: Corners) -> Self {
        Self { role, corners }
    }

    /// Axis-aligned box given by its center and full size along X, Y, Z.
    pub fn cuboid(role: Role, center: Point3d, size: [f64; 3]) -> Self {
        let h = Vec3::new(size[0] / 2.0, size[1] / 2.0, size[2] / 2.0);
        let (lo, hi) = (center - h, center + h);
        let corners = [
            Point3d::new(lo.x, lo.y, lo.z),
            Point3d::new(hi.x, lo.y, lo.z),
            Point3d::new(hi.x, hi.y, lo.z),
            Point3d::new(lo.x, hi.y, lo.z),
            Point3d::new(lo.x, lo.y, hi.z),
            Point3d::new(hi.x, lo.y, hi.z),
            Point3d::new(hi.x, hi.y, hi.z),
            Point3d::new(lo.x, hi.y, hi.z),
        ];
        Self { role, corners }
    }

    pub fn build(&self, store: &mut EntityStore) -> TaggedSolid {
        TaggedSolid {
            role: self.role,
            solid: make_hexahedron(store, self.corners),
        }
    }
}
