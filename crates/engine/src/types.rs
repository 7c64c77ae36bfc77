use std::sync::Arc;

use canopy_framing::beams::BraceVariant;
use canopy_framing::posts::PostVariant;
use canopy_framing::roof::slope::RoofShape;
use canopy_framing::roof::RoofingMaterial;
use canopy_framing::truss::TrussVariant;
use canopy_framing::Role;
use canopy_kernel::geometry::transform::Transform;
use canopy_tessellation::TriangleMesh;
use serde::{Deserialize, Serialize};

/// Structural variant of the roof: truss layout and roof shape together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoofVariant {
    /// Mono-pitch truss under a single-slope roof.
    #[serde(rename = "var-1")]
    SingleSlope,
    /// King-post truss under a gable roof.
    #[default]
    #[serde(rename = "var-2")]
    Gable,
    /// Fully webbed triangular truss under a gable roof.
    #[serde(rename = "var-3")]
    Arch,
}

impl RoofVariant {
    pub fn truss_variant(self) -> TrussVariant {
        match self {
            RoofVariant::SingleSlope => TrussVariant::SingleSlope,
            RoofVariant::Gable => TrussVariant::GableKingPost,
            RoofVariant::Arch => TrussVariant::TriangularArch,
        }
    }

    pub fn roof_shape(self) -> RoofShape {
        match self {
            RoofVariant::SingleSlope => RoofShape::SingleSlope,
            RoofVariant::Gable | RoofVariant::Arch => RoofShape::Gable,
        }
    }
}

/// Closest post spacing accepted; anything tighter would put a truss on
/// every few centimeters of ridge.
pub const MIN_POST_SPACING: f64 = 0.5;

fn default_side_overhang() -> f64 {
    0.1
}

/// Everything the user configures about a canopy. Dimensions are meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanopyParams {
    /// Post-to-post width across the span.
    pub width: f64,
    /// Post-to-post length along the ridge.
    pub length: f64,
    /// Height of the posts up to the beams.
    pub height: f64,
    pub roof_rise: f64,
    /// Largest distance between neighbouring posts along the ridge.
    pub post_spacing: f64,
    #[serde(default)]
    pub front_overhang: f64,
    #[serde(default)]
    pub back_overhang: f64,
    /// Roof cover overhang past the structure.
    #[serde(default = "default_side_overhang")]
    pub side_overhang: f64,
    #[serde(default)]
    pub roof_variant: RoofVariant,
    #[serde(default)]
    pub post_variant: PostVariant,
    #[serde(default)]
    pub brace_variant: Option<BraceVariant>,
    #[serde(default)]
    pub roofing_material: RoofingMaterial,
    /// Section descriptor such as `"150x150"`.
    #[serde(default)]
    pub post_section: Option<String>,
    /// Section descriptor such as `"45x190"`.
    #[serde(default)]
    pub truss_section: Option<String>,
}

impl Default for CanopyParams {
    fn default() -> Self {
        Self {
            width: 4.0,
            length: 6.0,
            height: 2.5,
            roof_rise: 1.0,
            post_spacing: 2.5,
            front_overhang: 0.0,
            back_overhang: 0.0,
            side_overhang: default_side_overhang(),
            roof_variant: RoofVariant::default(),
            post_variant: PostVariant::default(),
            brace_variant: None,
            roofing_material: RoofingMaterial::default(),
            post_section: None,
            truss_section: None,
        }
    }
}

impl CanopyParams {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|err| EngineError::InvalidJson {
            reason: err.to_string(),
        })
    }

    /// Reject non-finite or non-positive dimensions, negative overhangs and
    /// post spacings below [`MIN_POST_SPACING`].
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("width", self.width),
            ("length", self.length),
            ("height", self.height),
            ("roofRise", self.roof_rise),
            ("postSpacing", self.post_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::InvalidParameter { name, value });
            }
        }
        if self.post_spacing < MIN_POST_SPACING {
            return Err(EngineError::InvalidParameter {
                name: "postSpacing",
                value: self.post_spacing,
            });
        }
        let overhangs = [
            ("frontOverhang", self.front_overhang),
            ("backOverhang", self.back_overhang),
            ("sideOverhang", self.side_overhang),
        ];
        for (name, value) in overhangs {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// One placed mesh in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSolid {
    pub role: Role,
    /// Shared with the geometry cache and with other instances.
    pub mesh: Arc<TriangleMesh>,
    pub transform: Transform,
}

/// The complete output of one rebuild.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Generation {
    /// Assigned by [`crate::Engine`]; `0` for a free-standing rebuild.
    pub id: u64,
    pub solids: Vec<SceneSolid>,
}

impl Generation {
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &SceneSolid> {
        self.solids.iter().filter(move |s| s.role == role)
    }

    pub fn count(&self, role: Role) -> usize {
        self.with_role(role).count()
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }
}

/// Errors from the canopy engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("no canopy parameters set")]
    MissingParameters,

    #[error("no scene attached")]
    NoSceneAttached,

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("invalid canopy parameters: {reason}")]
    InvalidJson { reason: String },
}
