//! Placement of every structural part derived from [`CanopyParams`].

use canopy_framing::beams::{beam_section, BeamRun};
use canopy_framing::posts::{post_positions, stations};
use canopy_framing::roof::RoofSpec;
use canopy_framing::section::parse_section_or;
use canopy_framing::truss::{TrussConfig, TrussSpec, TrussVariant};
use canopy_framing::Section;
use canopy_kernel::geometry::point::Point3d;

use crate::types::{CanopyParams, EngineError};

/// Height of the beam stack under the trusses, in beam depths.
const BEAM_STACK: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub post_section: Section,
    pub truss_section: Section,
    pub beam_section: Section,
    /// Ridge-wise positions shared by post pairs and trusses.
    pub stations: Vec<f64>,
    pub post_positions: Vec<Point3d>,
    pub beams: BeamRun,
    pub truss_variant: TrussVariant,
    pub truss: TrussSpec,
    pub roof: RoofSpec,
}

impl Layout {
    pub fn derive(params: &CanopyParams) -> Result<Self, EngineError> {
        params.validate()?;

        let post_section = parse_section_or(params.post_section.as_deref(), Section::POST_DEFAULT);
        let truss_section = parse_section_or(params.truss_section.as_deref(), Section::TRUSS_DEFAULT);
        let beam_section = beam_section(params.post_variant, post_section);

        let beam_top = params.height + BEAM_STACK * beam_section.height;
        let config = TrussConfig::default();
        let truss = TrussSpec {
            span: params.width + config.eave_overhang,
            rise: params.roof_rise,
            section: truss_section,
            bottom_chord_height: beam_top + truss_section.height / 2.0,
            config,
        };
        let roof = RoofSpec {
            shape: params.roof_variant.roof_shape(),
            material: params.roofing_material,
            span_width: params.width,
            length_along_ridge: params.length,
            base_height: beam_top + truss_section.height,
            rise: params.roof_rise,
            overhang: params.side_overhang,
        };

        Ok(Self {
            post_section,
            truss_section,
            beam_section,
            stations: stations(params.length, params.post_spacing),
            post_positions: post_positions(params.width, params.length, params.post_spacing),
            beams: BeamRun {
                width: params.width,
                length: params.length,
                eave_height: params.height,
                front_overhang: params.front_overhang,
                back_overhang: params.back_overhang,
            },
            truss_variant: params.roof_variant.truss_variant(),
            truss,
            roof,
        })
    }
}
