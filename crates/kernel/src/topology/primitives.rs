use std::collections::HashMap;

use tracing::{debug, info, instrument};

use super::brep::*;
use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;

/// Face loops of a hexahedron whose corners are given as two rings of four:
/// `[a0, a1, a2, a3, b0, b1, b2, b3]` with `ai` joined to `bi`.
///
/// Loops wind counter-clockwise from outside when the first ring turns
/// counter-clockwise about the direction from ring `a` to ring `b`.
const HEXAHEDRON_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // start cap
    [4, 5, 6, 7], // end cap
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
];

/// Build a closed six-faced solid from two rings of four corners.
///
/// The rings may be skewed, tapered or cut by arbitrary planes (mitered
/// boards); only correspondence `ai ↔ bi` is required. Either ring
/// handedness is accepted: loops are flipped when the corners would
/// otherwise enclose a negative volume.
#[instrument(skip(store, corners))]
pub fn make_hexahedron(store: &mut EntityStore, corners: [Point3d; 8]) -> SolidId {
    let mut faces: Vec<Vec<usize>> = HEXAHEDRON_FACES.iter().map(|f| f.to_vec()).collect();
    if signed_volume(&corners, &faces) < 0.0 {
        for face in &mut faces {
            face.reverse();
        }
    }
    let solid_id = make_polyhedron(store, &corners, &faces);
    debug!(?solid_id, "created hexahedron");
    solid_id
}

/// Build an axis-aligned box solid from two opposite corners.
#[instrument(skip(store))]
pub fn make_box(store: &mut EntityStore, min: Point3d, max: Point3d) -> SolidId {
    info!(
        min = ?[min.x, min.y, min.z],
        max = ?[max.x, max.y, max.z],
        "creating box primitive"
    );
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    make_hexahedron(
        store,
        [
            Point3d::new(x0, y0, z0),
            Point3d::new(x1, y0, z0),
            Point3d::new(x1, y1, z0),
            Point3d::new(x0, y1, z0),
            Point3d::new(x0, y0, z1),
            Point3d::new(x1, y0, z1),
            Point3d::new(x1, y1, z1),
            Point3d::new(x0, y1, z1),
        ],
    )
}

fn signed_volume(points: &[Point3d], faces: &[Vec<usize>]) -> f64 {
    let mut sum = 0.0;
    for face in faces {
        let p0 = points[face[0]].to_vec3();
        for i in 1..face.len() - 1 {
            sum += p0.triple(&points[face[i]].to_vec3(), &points[face[i + 1]].to_vec3());
        }
    }
    sum / 6.0
}

/// Stitch planar faces given as vertex-index loops into a single-shell solid,
/// twin-linking half-edges that traverse the same vertex pair.
fn make_polyhedron(store: &mut EntityStore, points: &[Point3d], faces: &[Vec<usize>]) -> SolidId {
    let tolerance = crate::default_tolerance().coincidence;
    let vertex_ids: Vec<VertexId> = points
        .iter()
        .map(|p| store.vertices.insert(Vertex { point: *p, tolerance }))
        .collect();

    let solid_id = store.solids.insert(Solid { shells: vec![] });
    let shell_id = store.shells.insert(Shell {
        faces: vec![],
        solid: solid_id,
    });
    store.solids[solid_id].shells.push(shell_id);

    let mut edge_he_ids: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    for face_verts in faces {
        let loop_points: Vec<Point3d> = face_verts.iter().map(|&i| points[i]).collect();
        let centroid = centroid(&loop_points);
        let plane = Plane::new(centroid, newell_normal(&loop_points));

        let loop_id = store.loops.insert(Loop {
            half_edges: vec![],
            face: FaceId::default(),
        });
        let face_id = store.faces.insert(Face {
            plane,
            outer_loop: loop_id,
            shell: shell_id,
        });
        store.loops[loop_id].face = face_id;
        store.shells[shell_id].faces.push(face_id);

        let n = face_verts.len();
        for edge_idx in 0..n {
            let v_start_idx = face_verts[edge_idx];
            let v_end_idx = face_verts[(edge_idx + 1) % n];
            let edge_key = (v_start_idx.min(v_end_idx), v_start_idx.max(v_end_idx));

            let he_id = store.half_edges.insert(HalfEdge {
                edge: EdgeId::default(),
                twin: HalfEdgeId::default(),
                face: face_id,
                loop_id,
                start_vertex: vertex_ids[v_start_idx],
                end_vertex: vertex_ids[v_end_idx],
            });
            store.loops[loop_id].half_edges.push(he_id);

            if let Some(&twin_he_id) = edge_he_ids.get(&edge_key) {
                // This edge already exists — link twins
                let edge_id = store.half_edges[twin_he_id].edge;
                store.half_edges[he_id].twin = twin_he_id;
                store.half_edges[he_id].edge = edge_id;
                store.half_edges[twin_he_id].twin = he_id;
                store.edges[edge_id].half_edges.1 = he_id;
            } else {
                let edge_id = store.edges.insert(Edge {
                    half_edges: (he_id, HalfEdgeId::default()),
                    start_vertex: vertex_ids[edge_key.0],
                    end_vertex: vertex_ids[edge_key.1],
                });
                store.half_edges[he_id].edge = edge_id;
                edge_he_ids.insert(edge_key, he_id);
            }
        }
    }

    solid_id
}

fn centroid(points: &[Point3d]) -> Point3d {
    let n = points.len().max(1) as f64;
    let sum = points
        .iter()
        .fold(crate::geometry::vector::Vec3::ZERO, |acc, p| acc + p.to_vec3());
    Point3d::ORIGIN + sum / n
}
