//! Decorative post stacks.
//!
//! Every variant is a stack of axis-aligned boxes in post-local
//! coordinates: the post stands on the origin and reaches `height` in +Y.
//! `section.width` runs along X and `section.height` along Z.

use canopy_kernel::geometry::point::Point3d;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::{Piece, Role, Section};

const FOOTING_HEIGHT: f64 = 0.04;
const FOOTING_OVERHANG: f64 = 0.04;
const CAPITAL_HEIGHT: f64 = 0.08;
const CAPITAL_OVERHANG: f64 = 0.05;

const CLUSTER_SIZE: f64 = 0.08;
const CLUSTER_SPACING: f64 = 0.1;
const CROSSBAR_HEIGHT: f64 = 0.15;
const CROSSBAR_STEP: f64 = 0.51;

const RECESSED_ASTRAGAL_SIZE: f64 = 0.29;
const RECESSED_ASTRAGAL_HEIGHT: f64 = 0.05;

/// Smallest box extent worth emitting.
const MIN_EXTENT: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("post variant must be 1..=6, got {0}")]
pub struct InvalidPostVariant(pub u8);

/// Post designs, numbered 1..=6 in configurations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PostVariant {
    /// Four slim posts tied by crossbars, footing under the beam.
    Cluster,
    /// Tall base with recessed panels and an astragal.
    RecessedBase,
    /// Wide base, broad astragal, capital.
    TallBase,
    /// Low base, thin astragal, capital.
    LowBase,
    /// Plain post on a footing.
    #[default]
    Plain,
    /// Base and astragal at both ends with a cluster between.
    DoubleBase,
}

impl TryFrom<u8> for PostVariant {
    type Error = InvalidPostVariant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PostVariant::Cluster),
            2 => Ok(PostVariant::RecessedBase),
            3 => Ok(PostVariant::TallBase),
            4 => Ok(PostVariant::LowBase),
            5 => Ok(PostVariant::Plain),
            6 => Ok(PostVariant::DoubleBase),
            other => Err(InvalidPostVariant(other)),
        }
    }
}

impl From<PostVariant> for u8 {
    fn from(variant: PostVariant) -> Self {
        match variant {
            PostVariant::Cluster => 1,
            PostVariant::RecessedBase => 2,
            PostVariant::TallBase => 3,
            PostVariant::LowBase => 4,
            PostVariant::Plain => 5,
            PostVariant::DoubleBase => 6,
        }
    }
}

/// Square base topped by an astragal, both centered on the post axis.
#[derive(Debug, Clone, Copy)]
struct Pedestal {
    base_size: f64,
    base_height: f64,
    astragal_size: f64,
    astragal_height: f64,
}

impl Pedestal {
    const TALL: Pedestal = Pedestal {
        base_size: 0.38,
        base_height: 0.7,
        astragal_size: 0.48,
        astragal_height: 0.05,
    };
    const LOW: Pedestal = Pedestal {
        base_size: 0.28,
        base_height: 0.4,
        astragal_size: 0.3,
        astragal_height: 0.015,
    };

    fn top(&self) -> f64 {
        self.base_height + self.astragal_height
    }
}

/// Collects boxes, dropping any with a non-positive extent.
#[derive(Default)]
struct Stack(Vec<Piece>);

impl Stack {
    fn push(&mut self, role: Role, center: Point3d, size: [f64; 3]) {
        if size.iter().all(|s| s.is_finite() && *s > MIN_EXTENT) {
            self.0.push(Piece::cuboid(role, center, size));
        }
    }

    fn at(&mut self, role: Role, y: f64, size: [f64; 3]) {
        self.push(role, Point3d::new(0.0, y, 0.0), size);
    }

    /// Box standing on `y0` and reaching `y1`.
    fn column(&mut self, role: Role, y0: f64, y1: f64, width: f64, depth: f64) {
        self.at(role, (y0 + y1) / 2.0, [width, y1 - y0, depth]);
    }

    fn pedestal(&mut self, pedestal: &Pedestal) {
        let p = pedestal;
        self.column(Role::PostBase, 0.0, p.base_height, p.base_size, p.base_size);
        self.column(Role::PostBase, p.base_height, p.top(), p.astragal_size, p.astragal_size);
    }

    fn upper_post(&mut self, from: f64, height: f64, section: Section) {
        if height > from {
            self.column(Role::Post, from, height, section.width, section.height);
        }
    }

    fn capital(&mut self, height: f64, section: Section) {
        self.at(
            Role::PostBase,
            height - CAPITAL_HEIGHT / 2.0,
            [
                section.width + 2.0 * CAPITAL_OVERHANG,
                CAPITAL_HEIGHT,
                section.height + 2.0 * CAPITAL_OVERHANG,
            ],
        );
    }

    fn footing(&mut self, center_y: f64, section: Section) {
        self.at(
            Role::PostBase,
            center_y,
            [
                section.width + 2.0 * FOOTING_OVERHANG,
                FOOTING_HEIGHT,
                section.height + 2.0 * FOOTING_OVERHANG,
            ],
        );
    }

    /// Four slim posts on a 2×2 grid from `y0` to `y1`, tied by crossbars
    /// every [`CROSSBAR_STEP`] above `y0`.
    fn cluster(&mut self, y0: f64, y1: f64) {
        let h = CLUSTER_SPACING / 2.0;
        let grid = [(-h, -h), (h, -h), (-h, h), (h, h)];
        for (x, z) in grid {
            self.push(
                Role::Post,
                Point3d::new(x, (y0 + y1) / 2.0, z),
                [CLUSTER_SIZE, y1 - y0, CLUSTER_SIZE],
            );
        }

        let levels = ((y1 - y0) / CROSSBAR_STEP).floor().max(0.0) as usize;
        for level in 0..levels {
            let y = y0 + CROSSBAR_STEP * (level + 1) as f64;
            for x in [-h, h] {
                self.push(
                    Role::Post,
                    Point3d::new(x, y, 0.0),
                    [CLUSTER_SIZE, CROSSBAR_HEIGHT, CLUSTER_SPACING],
                );
            }
            for z in [-h, h] {
                self.push(
                    Role::Post,
                    Point3d::new(0.0, y, z),
                    [CLUSTER_SPACING, CROSSBAR_HEIGHT, CLUSTER_SIZE],
                );
            }
        }
    }

    /// Base with recessed panels: full plates top and bottom, four corner
    /// bars and two crossed panels set back from the faces. Returns its top.
    fn recessed_base(&mut self) -> f64 {
        const SIZE: f64 = 0.27;
        const HEIGHT: f64 = 1.035;
        const RECESS_WIDTH: f64 = 0.13;
        const RECESS_HEIGHT: f64 = 0.894;
        const RECESS_DEPTH: f64 = 0.02;

        let plate = (HEIGHT - RECESS_HEIGHT) / 2.0;
        let corner = (SIZE - RECESS_WIDTH) / 2.0;
        let mid_y = plate + RECESS_HEIGHT / 2.0;
        let offset = SIZE / 2.0 - corner / 2.0;
        let inset = SIZE - 2.0 * RECESS_DEPTH;

        self.column(Role::PostBase, 0.0, plate, SIZE, SIZE);
        for (x, z) in [(-offset, -offset), (offset, -offset), (-offset, offset), (offset, offset)] {
            self.push(
                Role::PostBase,
                Point3d::new(x, mid_y, z),
                [corner, RECESS_HEIGHT, corner],
            );
        }
        self.at(Role::PostBase, mid_y, [RECESS_WIDTH, RECESS_HEIGHT, inset]);
        self.at(Role::PostBase, mid_y, [inset, RECESS_HEIGHT, RECESS_WIDTH]);
        self.column(Role::PostBase, plate + RECESS_HEIGHT, HEIGHT, SIZE, SIZE);
        HEIGHT
    }
}

/// Boxes of one post of `variant` with shaft `section`, in post-local
/// coordinates.
pub fn post_pieces(variant: PostVariant, section: Section, height: f64) -> Vec<Piece> {
    let mut stack = Stack::default();
    match variant {
        PostVariant::Cluster => {
            let reduced = height - FOOTING_HEIGHT;
            stack.cluster(0.0, reduced);
            stack.footing(height - FOOTING_HEIGHT / 2.0, section);
        }
        PostVariant::RecessedBase => {
            let top = stack.recessed_base();
            let astragal = top + RECESSED_ASTRAGAL_HEIGHT;
            stack.column(Role::PostBase, top, astragal, RECESSED_ASTRAGAL_SIZE, RECESSED_ASTRAGAL_SIZE);
            stack.upper_post(astragal, height, section);
        }
        PostVariant::TallBase | PostVariant::LowBase => {
            let pedestal = if variant == PostVariant::TallBase {
                Pedestal::TALL
            } else {
                Pedestal::LOW
            };
            stack.pedestal(&pedestal);
            stack.upper_post(pedestal.top(), height, section);
            stack.capital(height, section);
        }
        PostVariant::Plain => {
            stack.column(Role::Post, 0.0, height, section.width, section.height);
            stack.footing(FOOTING_HEIGHT / 2.0, section);
        }
        PostVariant::DoubleBase => {
            let p = Pedestal::LOW;
            stack.pedestal(&p);
            stack.cluster(p.top(), height - p.top());
            stack.column(
                Role::PostBase,
                height - p.top(),
                height - p.base_height,
                p.astragal_size,
                p.astragal_size,
            );
            stack.column(Role::PostBase, height - p.base_height, height, p.base_size, p.base_size);
        }
    }
    debug!(?variant, height, boxes = stack.0.len(), "post stack");
    stack.0
}

/// Post bases along both long sides: `ceil(length / spacing) + 1` per side
/// (at least two), at `x = ±width/2`, spread evenly over `z ∈ [-length/2,
/// length/2]`.
pub fn post_positions(width: f64, length: f64, spacing: f64) -> Vec<Point3d> {
    let zs = stations(length, spacing);
    [-width / 2.0, width / 2.0]
        .into_iter()
        .flat_map(|x| zs.iter().map(move |&z| Point3d::new(x, 0.0, z)))
        .collect()
}

/// Stations along the ridge shared by posts and trusses.
pub fn stations(length: f64, spacing: f64) -> Vec<f64> {
    let count = if spacing > 0.0 && length.is_finite() {
        ((length / spacing).ceil().max(0.0) as usize + 1).max(2)
    } else {
        2
    };
    (0..count)
        .map(|i| -length / 2.0 + i as f64 * length / (count - 1) as f64)
        .collect()
}
