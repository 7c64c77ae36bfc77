//! Planar roof trusses.
//!
//! A truss lies in the plane `z = 0` and spans `x ∈ [-span/2, span/2]`. Its
//! bottom chord sits at `bottom_chord_height`; the top chord follows the
//! elevation profile of the selected [`TrussTopology`]. Trusses are placed
//! along the ridge by the caller.

use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::topology::brep::EntityStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::member::{build_member, MIN_MEMBER_LENGTH};
use crate::miter::{mitered_chain, MiterConfig};
use crate::types::{Member, MemberRole, Role, Section, TaggedSolid};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrussConfig {
    /// Chord segments per truss.
    pub segments: usize,
    /// Leave the top-chord ridge joint of tent-shaped trusses unmitered.
    pub ridge_exempt: bool,
    /// Spans below this produce an empty truss.
    pub min_span: f64,
    /// Rises below this are raised to it.
    pub min_rise: f64,
    /// Distance between the span and the post line of a single-slope truss.
    pub eave_overhang: f64,
    pub miter: MiterConfig,
}

impl Default for TrussConfig {
    fn default() -> Self {
        Self {
            segments: 8,
            ridge_exempt: true,
            min_span: 1.0,
            min_rise: 0.1,
            eave_overhang: 0.2,
            miter: MiterConfig::default(),
        }
    }
}

/// Everything needed to lay out one truss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrussSpec {
    pub span: f64,
    pub rise: f64,
    pub section: Section,
    pub bottom_chord_height: f64,
    pub config: TrussConfig,
}

impl TrussSpec {
    pub fn new(span: f64, rise: f64, section: Section, bottom_chord_height: f64) -> Self {
        Self {
            span,
            rise,
            section,
            bottom_chord_height,
            config: TrussConfig::default(),
        }
    }

    /// Rise actually used for the top chord.
    pub fn effective_rise(&self) -> f64 {
        self.rise.max(self.config.min_rise)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrussVariant {
    SingleSlope,
    GableKingPost,
    TriangularArch,
}

impl TrussVariant {
    pub fn topology(self) -> &'static dyn TrussTopology {
        match self {
            TrussVariant::SingleSlope => &SingleSlope,
            TrussVariant::GableKingPost => &GableKingPost,
            TrussVariant::TriangularArch => &TriangularArch,
        }
    }
}

/// Chord nodes of one truss, indexed `0..=segments`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrussNodes {
    pub top: Vec<Point3d>,
    pub bottom: Vec<Point3d>,
}

impl TrussNodes {
    pub fn segments(&self) -> usize {
        self.bottom.len().saturating_sub(1)
    }
}

/// Variant-specific parts of a truss layout.
pub trait TrussTopology: Sync {
    fn variant(&self) -> TrussVariant;

    /// Top-chord elevation above the bottom chord at node `i` of `n`, as a
    /// fraction of the rise.
    fn top_profile(&self, i: usize, n: usize) -> f64;

    /// Top-chord joint at the ridge, if the profile has one.
    fn ridge_joint(&self, _n: usize) -> Option<usize> {
        None
    }

    fn webs(&self, nodes: &TrussNodes, section: Section) -> Vec<Member>;

    fn posts(&self, nodes: &TrussNodes, spec: &TrussSpec) -> Vec<Member>;
}

/// Tent profile rising from both ends to 1 at the center.
fn tent_profile(i: usize, n: usize) -> f64 {
    1.0 - (2.0 * i as f64 / n as f64 - 1.0).abs()
}

/// Diagonal web in segment `i`: even segments run bottom[i] → top[i+1],
/// odd segments top[i] → bottom[i+1].
fn diagonal_web(nodes: &TrussNodes, i: usize, section: Section) -> Member {
    let (start, end) = if i % 2 == 0 {
        (nodes.bottom[i], nodes.top[i + 1])
    } else {
        (nodes.top[i], nodes.bottom[i + 1])
    };
    Member::new(start, end, section, MemberRole::Web)
}

/// Mono-pitch truss rising linearly from left to right, carried by two
/// vertical posts.
pub struct SingleSlope;

impl TrussTopology for SingleSlope {
    fn variant(&self) -> TrussVariant {
        TrussVariant::SingleSlope
    }

    fn top_profile(&self, i: usize, n: usize) -> f64 {
        i as f64 / n as f64
    }

    fn webs(&self, _nodes: &TrussNodes, _section: Section) -> Vec<Member> {
        Vec::new()
    }

    fn posts(&self, _nodes: &TrussNodes, spec: &TrussSpec) -> Vec<Member> {
        let span = spec.span;
        let rise = spec.effective_rise();
        let (h, t) = (spec.section.height, spec.section.width);
        let w = span - spec.config.eave_overhang;
        let base = spec.bottom_chord_height;

        [(-w / 2.0, -h / 2.0 + t / 2.0), (w / 2.0, -h / 2.0 - t / 2.0)]
            .into_iter()
            .map(|(post_x, offset)| {
                let top = base + rise * ((post_x + span / 2.0) / span);
                let x = post_x + offset;
                Member::new(
                    Point3d::new(x, base, 0.0),
                    Point3d::new(x, top, 0.0),
                    spec.section,
                    MemberRole::Post,
                )
            })
            // The eave post vanishes on long, flat spans.
            .filter(|post| post.effective_length() >= MIN_MEMBER_LENGTH)
            .collect()
    }
}

/// Symmetric gable truss with a king post and two center diagonals.
pub struct GableKingPost;

impl TrussTopology for GableKingPost {
    fn variant(&self) -> TrussVariant {
        TrussVariant::GableKingPost
    }

    fn top_profile(&self, i: usize, n: usize) -> f64 {
        tent_profile(i, n)
    }

    fn ridge_joint(&self, n: usize) -> Option<usize> {
        (n / 2).checked_sub(1)
    }

    fn webs(&self, nodes: &TrussNodes, section: Section) -> Vec<Member> {
        let n = nodes.segments();
        let half = n / 2;
        half.checked_sub(1)
            .into_iter()
            .chain([half])
            .filter(|&i| i < n)
            .map(|i| diagonal_web(nodes, i, section))
            .collect()
    }

    fn posts(&self, _nodes: &TrussNodes, spec: &TrussSpec) -> Vec<Member> {
        let rise = spec.effective_rise();
        let h = spec.section.height;
        let base = spec.bottom_chord_height;
        let pitch = rise.atan2(spec.span / 2.0);
        // Low pitches would cut the whole post away under the chords.
        let end_trim = ((h / 2.0) / pitch.tan()).min(spec.config.miter.max_trim_fraction * rise);
        let post = Member::new(
            Point3d::new(-h / 2.0, base, 0.0),
            Point3d::new(-h / 2.0, base + rise, 0.0),
            spec.section,
            MemberRole::Post,
        )
        .with_trims(0.0, end_trim);
        vec![post]
    }
}

/// Gable truss with a diagonal web in every panel.
pub struct TriangularArch;

impl TrussTopology for TriangularArch {
    fn variant(&self) -> TrussVariant {
        TrussVariant::TriangularArch
    }

    fn top_profile(&self, i: usize, n: usize) -> f64 {
        tent_profile(i, n)
    }

    fn ridge_joint(&self, n: usize) -> Option<usize> {
        (n / 2).checked_sub(1)
    }

    fn webs(&self, nodes: &TrussNodes, section: Section) -> Vec<Member> {
        (0..nodes.segments())
            .map(|i| diagonal_web(nodes, i, section))
            .collect()
    }

    fn posts(&self, _nodes: &TrussNodes, _spec: &TrussSpec) -> Vec<Member> {
        Vec::new()
    }
}

/// Members of one truss grouped by function.
#[derive(Debug, Clone, PartialEq)]
pub struct Truss {
    pub variant: TrussVariant,
    pub top_chord: Vec<Member>,
    pub bottom_chord: Vec<Member>,
    pub webs: Vec<Member>,
    pub posts: Vec<Member>,
}

impl Truss {
    fn empty(variant: TrussVariant) -> Self {
        Self {
            variant,
            top_chord: Vec::new(),
            bottom_chord: Vec::new(),
            webs: Vec::new(),
            posts: Vec::new(),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.top_chord
            .iter()
            .chain(&self.bottom_chord)
            .chain(&self.webs)
            .chain(&self.posts)
    }

    pub fn member_count(&self) -> usize {
        self.top_chord.len() + self.bottom_chord.len() + self.webs.len() + self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_count() == 0
    }
}

/// Chord nodes for `spec` under `topology`.
pub fn truss_nodes(topology: &dyn TrussTopology, spec: &TrussSpec) -> TrussNodes {
    let n = spec.config.segments;
    let rise = spec.effective_rise();
    let base = spec.bottom_chord_height;
    let x_at = |i: usize| -spec.span / 2.0 + spec.span * i as f64 / n as f64;
    TrussNodes {
        top: (0..=n)
            .map(|i| Point3d::new(x_at(i), base + rise * topology.top_profile(i, n), 0.0))
            .collect(),
        bottom: (0..=n).map(|i| Point3d::new(x_at(i), base, 0.0)).collect(),
    }
}

/// Lay out the members of one truss. Spans below the configured minimum
/// (or non-finite input) give an empty truss.
#[instrument(skip(spec), fields(span = spec.span, rise = spec.rise))]
pub fn build_truss(variant: TrussVariant, spec: &TrussSpec) -> Truss {
    let config = &spec.config;
    if !(spec.span.is_finite() && spec.rise.is_finite() && spec.bottom_chord_height.is_finite())
        || spec.span < config.min_span
        || config.segments == 0
    {
        debug!("span below minimum, empty truss");
        return Truss::empty(variant);
    }

    let topology = variant.topology();
    let n = config.segments;
    let nodes = truss_nodes(topology, spec);

    let ridge_skip: Vec<usize> = if config.ridge_exempt {
        topology.ridge_joint(n).into_iter().collect()
    } else {
        Vec::new()
    };
    let top_chord = mitered_chain(&nodes.top, spec.section, MemberRole::Chord, &ridge_skip, &config.miter);
    let bottom_chord = mitered_chain(&nodes.bottom, spec.section, MemberRole::Chord, &[], &config.miter);

    let truss = Truss {
        variant,
        top_chord,
        bottom_chord,
        webs: topology.webs(&nodes, spec.section),
        posts: topology.posts(&nodes, spec),
    };
    info!(?variant, members = truss.member_count(), "built truss");
    truss
}

/// Add every member of `truss` to `store`, skipping members too short to
/// build.
#[instrument(skip(store, truss), fields(variant = ?truss.variant))]
pub fn realize_truss(store: &mut EntityStore, truss: &Truss) -> Vec<TaggedSolid> {
    truss
        .members()
        .filter_map(|member| {
            build_member(store, member).map(|solid| TaggedSolid {
                role: Role::from(member.role),
                solid,
            })
        })
        .collect()
}
