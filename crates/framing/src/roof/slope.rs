//! Cover surface of single-slope and gable roofs.
//!
//! Elevations are defined over the structural span; the cover extends past
//! it by the overhang on every side, continuing the same slope. Slabs have
//! their bottom face on the surface and a vertical thickness.

use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Corners, Piece, Role};

/// Shortest main panel of a gable side, measured along the slope.
const MIN_MAIN_PANEL: f64 = 0.1;

/// Upward unit normal of the slope containing the in-plane (XY) direction
/// `dir`.
pub fn upward_normal(dir: Vec3) -> Vec3 {
    let n = Vec3::new(-dir.y, dir.x, 0.0);
    let n = if n.y < 0.0 { -n } else { n };
    n.normalized_or(Vec3::Y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoofShape {
    SingleSlope,
    Gable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofSurfaceParams {
    /// Structural width the rise is measured over.
    pub span_width: f64,
    pub length_along_ridge: f64,
    /// Elevation at the low structural edge (single slope) or both eaves
    /// (gable).
    pub base_height: f64,
    pub rise: f64,
    pub overhang: f64,
    /// Vertical slab thickness.
    pub thickness: f64,
    /// Extra height added at the ridge of a gable.
    pub ridge_lift: f64,
    /// Length along the slope of the ridge-adjacent strip of a gable side.
    pub flat_zone_len: f64,
}

impl Default for RoofSurfaceParams {
    fn default() -> Self {
        Self {
            span_width: 0.0,
            length_along_ridge: 0.0,
            base_height: 0.0,
            rise: 0.0,
            overhang: 0.0,
            thickness: 0.0,
            ridge_lift: 0.0,
            flat_zone_len: 0.05,
        }
    }
}

impl RoofSurfaceParams {
    /// Width of the cover including both side overhangs.
    pub fn covering_span(&self) -> f64 {
        self.span_width + 2.0 * self.overhang
    }

    /// Length of the cover including both end overhangs.
    pub fn covering_length(&self) -> f64 {
        self.length_along_ridge + 2.0 * self.overhang
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelRegion {
    Main,
    FlatZone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofPanel {
    pub region: PanelRegion,
    pub corners: Corners,
}

impl RoofPanel {
    pub fn role(&self) -> Role {
        match self.region {
            PanelRegion::Main => Role::RoofCover,
            PanelRegion::FlatZone => Role::RoofFlatZone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofSlopeGeometry {
    pub shape: RoofShape,
    pub params: RoofSurfaceParams,
}

impl RoofSlopeGeometry {
    pub fn new(shape: RoofShape, params: RoofSurfaceParams) -> Self {
        Self { shape, params }
    }

    /// Pitch of the structural surface.
    pub fn slope_angle(&self) -> f64 {
        let p = &self.params;
        match self.shape {
            RoofShape::SingleSlope => p.rise.atan2(p.span_width),
            RoofShape::Gable => p.rise.atan2(p.span_width / 2.0),
        }
    }

    /// Surface elevation at `x` in span coordinates (`0` at the low or left
    /// structural edge, `span_width` at the other). Values outside the span
    /// continue the slope.
    pub fn elevation_at(&self, x: f64) -> f64 {
        let p = &self.params;
        if p.span_width <= 0.0 {
            return p.base_height;
        }
        match self.shape {
            RoofShape::SingleSlope => p.base_height + p.rise * x / p.span_width,
            RoofShape::Gable => {
                let half = p.span_width / 2.0;
                p.base_height + (p.rise + p.ridge_lift) * (1.0 - (x - half).abs() / half)
            }
        }
    }

    /// Surface elevation at world `x` (structure centered on the origin).
    pub fn world_elevation(&self, x: f64) -> f64 {
        self.elevation_at(x + self.params.span_width / 2.0)
    }

    /// Top of the slab at world `x`.
    pub fn top_elevation(&self, x: f64) -> f64 {
        self.world_elevation(x) + self.params.thickness
    }

    pub fn half_covering_span(&self) -> f64 {
        self.params.covering_span() / 2.0
    }

    pub fn half_covering_length(&self) -> f64 {
        self.params.covering_length() / 2.0
    }

    /// Surface point at world `x` on the plane `z`.
    pub fn surface_point(&self, x: f64, z: f64) -> Point3d {
        Point3d::new(x, self.world_elevation(x), z)
    }

    /// Length along the surface from the eave at world `x0` to `x1`.
    pub fn slope_distance(&self, x0: f64, x1: f64) -> f64 {
        self.surface_point(x0, 0.0).distance_to(&self.surface_point(x1, 0.0))
    }

    pub fn panels(&self) -> Vec<RoofPanel> {
        let p = &self.params;
        debug_assert!(
            p.covering_span() >= p.span_width,
            "covering span narrower than the structure"
        );
        let hw = self.half_covering_span();
        let mut panels = Vec::new();
        match self.shape {
            RoofShape::SingleSlope => panels.push(RoofPanel {
                region: PanelRegion::Main,
                corners: self.slab(-hw, hw),
            }),
            RoofShape::Gable => {
                for sign in [-1.0, 1.0] {
                    self.gable_side(sign, hw, &mut panels);
                }
            }
        }
        debug!(shape = ?self.shape, panels = panels.len(), "roof panels");
        panels
    }

    pub fn pieces(&self) -> Vec<Piece> {
        self.panels()
            .into_iter()
            .map(|panel| Piece::new(panel.role(), panel.corners))
            .collect()
    }

    /// Main panel and flat strip of one gable side, `sign` −1 left, +1 right.
    fn gable_side(&self, sign: f64, hw: f64, panels: &mut Vec<RoofPanel>) {
        let eave_x = sign * hw;
        let slope_len = self.slope_distance(eave_x, 0.0);
        if slope_len <= f64::EPSILON {
            return;
        }
        let main_len = slope_len.min((slope_len - self.params.flat_zone_len).max(MIN_MAIN_PANEL));
        let inner_x = eave_x * (1.0 - main_len / slope_len);

        panels.push(RoofPanel {
            region: PanelRegion::Main,
            corners: self.slab(eave_x, inner_x),
        });
        if slope_len - main_len > 1e-9 {
            panels.push(RoofPanel {
                region: PanelRegion::FlatZone,
                corners: self.slab(inner_x, 0.0),
            });
        }
    }

    /// Slab over `x0..x1` spanning the covering length.
    fn slab(&self, x0: f64, x1: f64) -> Corners {
        let hl = self.half_covering_length();
        let t = self.params.thickness;
        let (y0, y1) = (self.world_elevation(x0), self.world_elevation(x1));
        let ring = [(x0, y0), (x1, y1), (x1, y1 + t), (x0, y0 + t)];
        let mut corners = [Point3d::ORIGIN; 8];
        for (i, &(x, y)) in ring.iter().enumerate() {
            corners[i] = Point3d::new(x, y, -hl);
            corners[i + 4] = Point3d::new(x, y, hl);
        }
        corners
    }
}
