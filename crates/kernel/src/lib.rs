//! Geometric kernel for timber framing: points, vectors, transforms,
//! cutting planes and a slotmap-arena B-rep of planar-faced solids.

pub mod geometry;
pub mod topology;

/// Global tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (meters).
    pub coincidence: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
        }
    }
}

/// Default tolerance used for vertex tolerances of new solids.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
