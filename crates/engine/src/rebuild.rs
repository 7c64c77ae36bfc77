use std::collections::BTreeMap;
use std::sync::Arc;

use canopy_framing::beams::{brace_members, BRACE_SECTION};
use canopy_framing::member::{local_corners, member_frame};
use canopy_framing::posts::post_pieces;
use canopy_framing::roof::roof_pieces;
use canopy_framing::truss::{build_truss, realize_truss};
use canopy_framing::{Piece, Role};
use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::transform::Transform;
use canopy_kernel::topology::brep::{EntityStore, SolidId};
use canopy_tessellation::{tessellate_solids, TriangleMesh};
use tracing::{debug, info, instrument};

use crate::cache::GeometryCache;
use crate::layout::Layout;
use crate::resolve::MeshResolver;
use crate::types::{CanopyParams, EngineError, Generation, SceneSolid};

/// Build the complete scene for `params`.
///
/// The result depends only on `params` and the resolver: the cache changes
/// how much work is done, never what is produced. Posts and trusses are
/// tessellated once and instanced at every station.
#[instrument(skip_all, fields(roof = ?params.roof_variant, posts = ?params.post_variant))]
pub fn rebuild(
    params: &CanopyParams,
    cache: &mut GeometryCache,
    resolver: &dyn MeshResolver,
) -> Result<Generation, EngineError> {
    let layout = Layout::derive(params)?;
    let mut solids = Vec::new();

    add_posts(params, &layout, cache, &mut solids);
    add_beams(&layout, cache, &mut solids);
    add_braces(params, &layout, cache, resolver, &mut solids);
    add_trusses(&layout, cache, &mut solids);
    add_roof(&layout, cache, &mut solids);

    info!(
        solids = solids.len(),
        cached = cache.len(),
        hits = cache.hits(),
        misses = cache.misses(),
        "rebuilt canopy"
    );
    Ok(Generation { id: 0, solids })
}

fn tessellate_pieces<'a>(pieces: impl IntoIterator<Item = &'a Piece>) -> TriangleMesh {
    let mut store = EntityStore::new();
    let ids: Vec<SolidId> = pieces.into_iter().map(|p| p.build(&mut store).solid).collect();
    tessellate_solids(&store, &ids)
}

fn by_role(pieces: Vec<Piece>) -> BTreeMap<Role, Vec<Piece>> {
    let mut groups: BTreeMap<Role, Vec<Piece>> = BTreeMap::new();
    for piece in pieces {
        groups.entry(piece.role).or_default().push(piece);
    }
    groups
}

fn translation_to(p: Point3d) -> Transform {
    Transform::translation(p.x, p.y, p.z)
}

fn add_posts(params: &CanopyParams, layout: &Layout, cache: &mut GeometryCache, out: &mut Vec<SceneSolid>) {
    let s = layout.post_section;
    for (role, pieces) in by_role(post_pieces(params.post_variant, s, params.height)) {
        let key = format!(
            "post:{}:{:.6}x{:.6}:{:.6}:{role:?}",
            u8::from(params.post_variant),
            s.width,
            s.height,
            params.height
        );
        let mesh = cache.get_or_insert_with(key, || tessellate_pieces(&pieces));
        out.extend(layout.post_positions.iter().map(|&p| SceneSolid {
            role,
            mesh: Arc::clone(&mesh),
            transform: translation_to(p),
        }));
    }
}

fn add_beams(layout: &Layout, cache: &mut GeometryCache, out: &mut Vec<SceneSolid>) {
    let s = layout.beam_section;
    let length = layout.beams.beam_length();
    let key = format!("beam:{:.6}x{:.6}:{length:.6}", s.width, s.height);
    let mesh = cache.get_or_insert_with(key, || {
        tessellate_pieces(&[Piece::cuboid(Role::Beam, Point3d::ORIGIN, [s.width, s.height, length])])
    });
    // Placed boxes give the instance centers.
    for piece in layout.beams.pieces(s) {
        let center = piece.corners[0].midpoint(&piece.corners[6]);
        out.push(SceneSolid {
            role: Role::Beam,
            mesh: Arc::clone(&mesh),
            transform: translation_to(center),
        });
    }
}

fn add_braces(
    params: &CanopyParams,
    layout: &Layout,
    cache: &mut GeometryCache,
    resolver: &dyn MeshResolver,
    out: &mut Vec<SceneSolid>,
) {
    let Some(variant) = params.brace_variant else {
        return;
    };
    let external = resolver.resolve(&variant.asset_key());
    for member in brace_members(variant, params.width, params.height, &layout.stations) {
        let Some(frame) = member_frame(&member) else {
            continue;
        };
        let mesh = match &external {
            Some(mesh) => Arc::clone(mesh),
            None => {
                let key = format!(
                    "brace-box:{:.6}x{:.6}:{:.6}",
                    BRACE_SECTION.width, BRACE_SECTION.height, frame.length
                );
                cache.get_or_insert_with(key, || {
                    let corners = local_corners(frame.length, BRACE_SECTION);
                    tessellate_pieces(&[Piece::new(Role::Brace, corners)])
                })
            }
        };
        out.push(SceneSolid {
            role: Role::Brace,
            mesh,
            transform: frame.transform,
        });
    }
    debug!(?variant, external = external.is_some(), "braces placed");
}

fn add_trusses(layout: &Layout, cache: &mut GeometryCache, out: &mut Vec<SceneSolid>) {
    let spec = &layout.truss;
    let variant = layout.truss_variant;
    let truss = build_truss(variant, spec);
    if truss.is_empty() {
        debug!("no trusses for this span");
        return;
    }
    let key_base = format!(
        "truss:{variant:?}:{:.6}:{:.6}:{:.6}x{:.6}:{:.6}",
        spec.span, spec.rise, spec.section.width, spec.section.height, spec.bottom_chord_height
    );

    let mut meshes: BTreeMap<Role, Arc<TriangleMesh>> = BTreeMap::new();
    for role in [Role::TrussChord, Role::TrussWeb, Role::TrussPost] {
        let key = format!("{key_base}:{role:?}");
        let mesh = cache.get_or_insert_with(key, || {
            let mut store = EntityStore::new();
            let ids: Vec<SolidId> = realize_truss(&mut store, &truss)
                .into_iter()
                .filter(|tagged| tagged.role == role)
                .map(|tagged| tagged.solid)
                .collect();
            tessellate_solids(&store, &ids)
        });
        if !mesh.is_empty() {
            meshes.insert(role, mesh);
        }
    }

    for &z in &layout.stations {
        for (&role, mesh) in &meshes {
            out.push(SceneSolid {
                role,
                mesh: Arc::clone(mesh),
                transform: Transform::translation(0.0, 0.0, z),
            });
        }
    }
}

fn add_roof(layout: &Layout, cache: &mut GeometryCache, out: &mut Vec<SceneSolid>) {
    let roof = &layout.roof;
    let key_base = format!(
        "roof:{:?}:{:?}:{:.6}:{:.6}:{:.6}:{:.6}:{:.6}",
        roof.shape, roof.material, roof.span_width, roof.length_along_ridge, roof.base_height, roof.rise, roof.overhang
    );
    for (role, pieces) in by_role(roof_pieces(roof)) {
        let key = format!("{key_base}:{role:?}");
        let mesh = cache.get_or_insert_with(key, || tessellate_pieces(&pieces));
        out.push(SceneSolid {
            role,
            mesh,
            transform: Transform::identity(),
        });
    }
}
