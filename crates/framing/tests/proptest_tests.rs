//! Property-based tests for framing invariants using the `proptest` crate.

use proptest::prelude::*;

use canopy_framing::miter::{miter_chain, miter_trim, mitered_chain, MiterConfig};
use canopy_framing::member::{build_member, member_frame, MIN_MEMBER_LENGTH};
use canopy_framing::posts::{post_pieces, PostVariant};
use canopy_framing::roof::slope::RoofShape;
use canopy_framing::roof::{build_roof, RoofSpec, RoofingMaterial};
use canopy_framing::truss::{build_truss, realize_truss, TrussSpec, TrussVariant};
use canopy_framing::{MemberRole, Section};
use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::vector::Vec3;
use canopy_kernel::topology::brep::{audit_solid, EntityStore};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_direction() -> impl Strategy<Value = Vec3> {
    (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
        .prop_filter("non-degenerate direction", |(x, y, z)| x * x + y * y + z * z > 1e-3)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Polyline in the XY plane with segments of at least 15 cm.
fn arb_polyline() -> impl Strategy<Value = Vec<Point3d>> {
    prop::collection::vec((0.15f64..3.0, -std::f64::consts::PI..std::f64::consts::PI), 1..10).prop_map(
        |steps| {
            let mut points = vec![Point3d::ORIGIN];
            for (len, angle) in steps {
                let last = points[points.len() - 1];
                points.push(last + Vec3::new(len * angle.cos(), len * angle.sin(), 0.0));
            }
            points
        },
    )
}

fn arb_material() -> impl Strategy<Value = RoofingMaterial> {
    prop_oneof![
        Just(RoofingMaterial::MetalTile),
        Just(RoofingMaterial::ProfiledSheet),
        Just(RoofingMaterial::Shingle),
        Just(RoofingMaterial::Polycarbonate),
    ]
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Miter trims are finite, non-negative and clamped to the shorter member
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn miter_trim_is_bounded(
        incoming in arb_direction(),
        outgoing in arb_direction(),
        depth in 0.0f64..0.5,
        len_in in 0.01f64..10.0,
        len_out in 0.01f64..10.0,
    ) {
        let config = MiterConfig::default();
        let s = miter_trim(incoming, outgoing, depth, len_in, len_out, &config);
        prop_assert!(s.is_finite());
        prop_assert!(s >= 0.0);
        prop_assert!(s <= 0.45 * len_in.min(len_out) + TOL, "trim {} over clamp", s);
    }

    #[test]
    fn miter_trim_is_symmetric_in_length(
        incoming in arb_direction(),
        outgoing in arb_direction(),
        len_in in 0.01f64..10.0,
        len_out in 0.01f64..10.0,
    ) {
        let config = MiterConfig::default();
        let a = miter_trim(incoming, outgoing, 0.19, len_in, len_out, &config);
        let b = miter_trim(incoming, outgoing, 0.19, len_out, len_in, &config);
        prop_assert!((a - b).abs() < TOL);
    }

    #[test]
    fn adjacent_members_share_joint_trim(points in arb_polyline(), depth in 0.01f64..0.4) {
        let section = Section::new(0.045, depth);
        let members = mitered_chain(&points, section, MemberRole::Chord, &[], &MiterConfig::default());
        for pair in members.windows(2) {
            prop_assert_eq!(pair[0].end_trim, pair[1].start_trim);
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn chain_has_one_trim_per_joint(points in arb_polyline()) {
        let trims = miter_chain(&points, 0.19, &[], &MiterConfig::default());
        prop_assert_eq!(trims.len(), points.len().saturating_sub(2));
        prop_assert!(trims.iter().all(|t| t.is_finite() && *t >= 0.0));
    }
}

// ---------------------------------------------------------------------------
// 2. Mitered members keep a positive length and build closed solids
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn mitered_members_keep_length(points in arb_polyline(), depth in 0.01f64..0.4) {
        let section = Section::new(0.045, depth);
        let members = mitered_chain(&points, section, MemberRole::Chord, &[], &MiterConfig::default());
        prop_assert_eq!(members.len(), points.len() - 1);
        let mut store = EntityStore::new();
        for m in &members {
            // Each end loses at most 45 % of the member.
            prop_assert!(m.effective_length() >= 0.1 * m.axis_length() - TOL);
            let frame = member_frame(m);
            prop_assert!(frame.is_some());
            if let Some(solid) = build_member(&mut store, m) {
                prop_assert!(audit_solid(&store, solid).all_valid());
                let expected = m.effective_length() * section.width * section.height;
                prop_assert!((store.solid_volume(solid) - expected).abs() < 1e-6 * (1.0 + expected));
            }
        }
    }

    #[test]
    fn trusses_realize_valid_solids(
        span in 1.0f64..12.0,
        rise in 0.0f64..3.0,
        variant in prop_oneof![
            Just(TrussVariant::SingleSlope),
            Just(TrussVariant::GableKingPost),
            Just(TrussVariant::TriangularArch),
        ],
    ) {
        let truss = build_truss(variant, &TrussSpec::new(span, rise, Section::TRUSS_DEFAULT, 3.0));
        prop_assert!(!truss.is_empty());
        for m in truss.members() {
            prop_assert!(m.effective_length() >= MIN_MEMBER_LENGTH, "{:?}", m);
        }
        let mut store = EntityStore::new();
        let solids = realize_truss(&mut store, &truss);
        prop_assert_eq!(solids.len(), truss.member_count());
        for tagged in solids {
            let audit = audit_solid(&store, tagged.solid);
            prop_assert!(audit.all_valid(), "{:?}: {:?}", tagged.role, audit.errors);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Roof boards and post stacks are closed solids
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roof_trim_boards_close(
        span in 2.0f64..10.0,
        length in 2.0f64..12.0,
        rise in 0.2f64..2.5,
        overhang in 0.05f64..0.5,
        gable in any::<bool>(),
        material in arb_material(),
    ) {
        let spec = RoofSpec {
            shape: if gable { RoofShape::Gable } else { RoofShape::SingleSlope },
            material,
            span_width: span,
            length_along_ridge: length,
            base_height: 2.5,
            rise,
            overhang,
        };
        let mut store = EntityStore::new();
        let solids = build_roof(&mut store, &spec);
        prop_assert!(!solids.is_empty());
        for tagged in solids {
            let audit = audit_solid(&store, tagged.solid);
            prop_assert!(audit.all_valid(), "{:?}: {:?}", tagged.role, audit.errors);
        }
    }

    #[test]
    fn post_stacks_close(variant in 1u8..=6, height in 1.2f64..4.0) {
        let variant = PostVariant::try_from(variant).unwrap();
        let mut store = EntityStore::new();
        for piece in post_pieces(variant, Section::POST_DEFAULT, height) {
            let tagged = piece.build(&mut store);
            prop_assert!(audit_solid(&store, tagged.solid).all_valid());
        }
    }
}
