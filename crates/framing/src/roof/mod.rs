//! Roof cover, substructure and trim.
//!
//! Everything on the roof is a hexahedral [`Piece`]: cover slabs, battens,
//! deck panels, fascia and rake boards and ridge-cap wings. [`roof_pieces`]
//! stacks them in order: the substructure on the structural surface, then
//! the cover lifted by the substructure's height, then trim on the cover.

pub mod slope;
pub mod substructure;
pub mod trim;

use canopy_kernel::topology::brep::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::types::{Piece, TaggedSolid};
use slope::{RoofShape, RoofSlopeGeometry, RoofSurfaceParams};
use substructure::Substructure;
use trim::{trim_pieces, TrimProfile};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoofingMaterial {
    #[default]
    #[serde(rename = "metal-grandline", alias = "metal-tile")]
    MetalTile,
    #[serde(rename = "profiled-gl35r", alias = "profiled-sheet")]
    ProfiledSheet,
    #[serde(rename = "shinglas-sonata", alias = "shingle")]
    Shingle,
    #[serde(rename = "polycarbonate-8mm", alias = "polycarbonate")]
    Polycarbonate,
    #[serde(rename = "no-roofing")]
    NoRoofing,
}

impl RoofingMaterial {
    /// Vertical thickness of the cover sheet, `None` when there is no roof.
    pub fn cover_thickness(self) -> Option<f64> {
        match self {
            RoofingMaterial::MetalTile | RoofingMaterial::ProfiledSheet => Some(0.001),
            RoofingMaterial::Shingle => Some(0.003),
            RoofingMaterial::Polycarbonate => Some(0.008),
            RoofingMaterial::NoRoofing => None,
        }
    }
}

/// Structural description of a roof.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofSpec {
    pub shape: RoofShape,
    pub material: RoofingMaterial,
    /// Post-to-post width the rise is measured over.
    pub span_width: f64,
    pub length_along_ridge: f64,
    /// Elevation of the structural surface at the eave posts.
    pub base_height: f64,
    pub rise: f64,
    /// Cover overhang beyond the structure on every side.
    pub overhang: f64,
}

impl RoofSpec {
    fn surface(&self, base_height: f64, thickness: f64) -> RoofSurfaceParams {
        RoofSurfaceParams {
            span_width: self.span_width,
            length_along_ridge: self.length_along_ridge,
            base_height,
            rise: self.rise,
            overhang: self.overhang,
            thickness,
            ..RoofSurfaceParams::default()
        }
    }
}

/// All roof pieces for `spec`; empty for [`RoofingMaterial::NoRoofing`].
#[instrument(skip(spec), fields(shape = ?spec.shape, material = ?spec.material))]
pub fn roof_pieces(spec: &RoofSpec) -> Vec<Piece> {
    let Some(cover_thickness) = spec.material.cover_thickness() else {
        return Vec::new();
    };

    let structural = RoofSlopeGeometry::new(spec.shape, spec.surface(spec.base_height, 0.0));
    let layer = Substructure::for_material(spec.material);
    let mut pieces = layer.pieces(&structural);
    let sub_count = pieces.len();

    let lift = layer.height_offset(structural.slope_angle());
    let cover = RoofSlopeGeometry::new(
        spec.shape,
        spec.surface(spec.base_height + lift, cover_thickness),
    );
    pieces.extend(cover.pieces());
    let cover_count = pieces.len() - sub_count;

    if let Some(profile) = TrimProfile::for_material(spec.material) {
        pieces.extend(trim_pieces(&cover, &profile));
    }
    info!(
        substructure = sub_count,
        cover = cover_count,
        trim = pieces.len() - sub_count - cover_count,
        "roof pieces"
    );
    pieces
}

pub fn build_roof(store: &mut EntityStore, spec: &RoofSpec) -> Vec<TaggedSolid> {
    roof_pieces(spec).iter().map(|piece| piece.build(store)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use canopy_kernel::topology::brep::audit_solid;

    fn spec(shape: RoofShape, material: RoofingMaterial) -> RoofSpec {
        RoofSpec {
            shape,
            material,
            span_width: 6.0,
            length_along_ridge: 6.0,
            base_height: 3.0,
            rise: 1.0,
            overhang: 0.1,
        }
    }

    fn count(pieces: &[Piece], role: Role) -> usize {
        pieces.iter().filter(|p| p.role == role).count()
    }

    #[test]
    fn test_no_roofing_is_empty() {
        assert!(roof_pieces(&spec(RoofShape::Gable, RoofingMaterial::NoRoofing)).is_empty());
    }

    #[test]
    fn test_gable_metal_roof_parts() {
        let pieces = roof_pieces(&spec(RoofShape::Gable, RoofingMaterial::MetalTile));
        assert_eq!(count(&pieces, Role::RoofCover), 2);
        assert_eq!(count(&pieces, Role::RoofFlatZone), 2);
        assert_eq!(count(&pieces, Role::Fascia), 2);
        assert_eq!(count(&pieces, Role::Rake), 4);
        assert_eq!(count(&pieces, Role::RidgeCap), 2);
        assert!(count(&pieces, Role::Substructure) > 10);
    }

    #[test]
    fn test_battens_stay_under_cover() {
        let roof = spec(RoofShape::SingleSlope, RoofingMaterial::ProfiledSheet);
        let pieces = roof_pieces(&roof);
        let alpha = roof.rise.atan2(roof.span_width);
        let lift = 0.025 / alpha.cos();
        let cover_bottom =
            |x: f64| roof.base_height + lift + roof.rise * (x + roof.span_width / 2.0) / roof.span_width;
        let mut touching = 0;
        for c in pieces.iter().filter(|p| p.role == Role::Substructure).flat_map(|p| p.corners) {
            let gap = cover_bottom(c.x) - c.y;
            assert!(gap > -1e-9, "batten corner {c:?} pierces the cover");
            if gap.abs() < 1e-9 {
                touching += 1;
            }
        }
        assert!(touching > 0);
    }

    #[test]
    fn test_every_roof_piece_is_a_valid_solid() {
        for shape in [RoofShape::SingleSlope, RoofShape::Gable] {
            for material in [
                RoofingMaterial::MetalTile,
                RoofingMaterial::Shingle,
                RoofingMaterial::Polycarbonate,
            ] {
                let mut store = EntityStore::new();
                for tagged in build_roof(&mut store, &spec(shape, material)) {
                    let audit = audit_solid(&store, tagged.solid);
                    assert!(audit.all_valid(), "{shape:?} {material:?} {:?}: {:?}", tagged.role, audit.errors);
                }
            }
        }
    }

    #[test]
    fn test_material_serde_names() {
        let m: RoofingMaterial = serde_json::from_str("\"polycarbonate-8mm\"").unwrap();
        assert_eq!(m, RoofingMaterial::Polycarbonate);
        let m: RoofingMaterial = serde_json::from_str("\"shingle\"").unwrap();
        assert_eq!(m, RoofingMaterial::Shingle);
        assert_eq!(serde_json::to_string(&RoofingMaterial::NoRoofing).unwrap(), "\"no-roofing\"");
    }
}
