//! Battens, purlins or deck between the trusses and the roof cover.

use canopy_kernel::geometry::point::Point3d;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::slope::{upward_normal, RoofShape, RoofSlopeGeometry, RoofSurfaceParams};
use super::RoofingMaterial;
use crate::board::MiteredBoard;
use crate::types::{Piece, Role};

/// Horizontal gap kept between the last gable batten and the ridge.
const RIDGE_GAP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Substructure {
    /// Bars lying on the slope, running along the ridge.
    Battens {
        /// Maximum spacing along the slope.
        step: f64,
        /// Extent along the slope.
        width: f64,
        /// Extent normal to the slope.
        height: f64,
    },
    /// Continuous sheathing with vertical thickness.
    Deck { thickness: f64 },
    None,
}

impl Substructure {
    pub fn for_material(material: RoofingMaterial) -> Self {
        match material {
            RoofingMaterial::MetalTile | RoofingMaterial::ProfiledSheet => Substructure::Battens {
                step: 0.35,
                width: 0.10,
                height: 0.025,
            },
            RoofingMaterial::Polycarbonate => Substructure::Battens {
                step: 0.5,
                width: 0.05,
                height: 0.05,
            },
            RoofingMaterial::Shingle => Substructure::Deck { thickness: 0.012 },
            RoofingMaterial::NoRoofing => Substructure::None,
        }
    }

    /// How far the cover is raised above the structural surface, measured
    /// vertically, on a slope of `angle`.
    pub fn height_offset(&self, angle: f64) -> f64 {
        match *self {
            Substructure::Battens { height, .. } => height / angle.cos(),
            Substructure::Deck { thickness } => thickness,
            Substructure::None => 0.0,
        }
    }

    /// Pieces laid on `surface`, the structural roof surface.
    pub fn pieces(&self, surface: &RoofSlopeGeometry) -> Vec<Piece> {
        let pieces = match *self {
            Substructure::Battens { step, width, height } => battens(surface, step, width, height),
            Substructure::Deck { thickness } => deck(surface, thickness),
            Substructure::None => Vec::new(),
        };
        debug!(layer = ?self, pieces = pieces.len(), "roof substructure");
        pieces
    }
}

fn deck(surface: &RoofSlopeGeometry, thickness: f64) -> Vec<Piece> {
    let sheet = RoofSlopeGeometry::new(
        surface.shape,
        RoofSurfaceParams {
            thickness,
            flat_zone_len: 0.0,
            ..surface.params
        },
    );
    sheet
        .panels()
        .into_iter()
        .map(|panel| Piece::new(Role::Substructure, panel.corners))
        .collect()
}

/// Slope runs as `(eave x, far x, usable length)`. Bars are laid from the
/// eave toward the far end; the usable length is where a bar may start.
fn slope_runs(surface: &RoofSlopeGeometry, width: f64) -> Vec<(f64, f64, f64)> {
    let hw = surface.half_covering_span();
    match surface.shape {
        RoofShape::SingleSlope => {
            let len = surface.slope_distance(-hw, hw);
            vec![(-hw, hw, len - width)]
        }
        RoofShape::Gable => [-hw, hw]
            .into_iter()
            .map(|eave| {
                let len = surface.slope_distance(eave, 0.0);
                let gap = len * RIDGE_GAP / hw.max(f64::EPSILON);
                (eave, 0.0, len - gap - width)
            })
            .collect(),
    }
}

fn battens(surface: &RoofSlopeGeometry, step: f64, width: f64, height: f64) -> Vec<Piece> {
    let hl = surface.half_covering_length();
    let mut pieces = Vec::new();
    for (eave, far, usable) in slope_runs(surface, width) {
        let full = surface.slope_distance(eave, far);
        if usable <= 0.0 || full <= 0.0 || step <= 0.0 {
            continue;
        }
        let count = ((full / step).ceil() as usize + 1).max(2);
        let dir = (surface.surface_point(far, 0.0) - surface.surface_point(eave, 0.0)) / full;
        let normal = upward_normal(dir);

        for k in 0..count {
            let s = usable * k as f64 / (count - 1) as f64;
            let base = surface.surface_point(eave, 0.0) + dir * s;
            let top = base + normal * height;
            let start = Point3d::new(top.x, top.y, -hl);
            let end = Point3d::new(top.x, top.y, hl);
            let (sp, ep) = MiteredBoard::square_planes(start, end);
            // Thickness runs to the left of +Z, i.e. up the slope on the left
            // side and down it on the right; flip the run for the right side.
            let board = if dir.x >= 0.0 {
                MiteredBoard::rectangular(start, end, normal, height, width, sp, ep)
            } else {
                MiteredBoard::rectangular(end, start, normal, height, width, ep, sp)
            };
            pieces.push(Piece::new(Role::Substructure, board.corners()));
        }
    }
    pieces
}
