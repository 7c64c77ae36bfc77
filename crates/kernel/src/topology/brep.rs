use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashSet;

use crate::geometry::plane::Plane;
use crate::geometry::point::Point3d;
use crate::geometry::transform::BoundingBox;
use crate::geometry::vector::Vec3;

// ─── Entity Keys ─────────────────────────────────────────────────────────────

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct HalfEdgeId;
    pub struct LoopId;
    pub struct FaceId;
    pub struct ShellId;
    pub struct SolidId;
}

// ─── Topological Entities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Point3d,
    pub tolerance: f64,
}

/// A straight edge between two vertices. Framing solids are bounded by
/// planar faces only, so edges carry no curve geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub half_edges: (HalfEdgeId, HalfEdgeId),
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HalfEdge {
    pub edge: EdgeId,
    pub twin: HalfEdgeId,
    pub face: FaceId,
    pub loop_id: LoopId,
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loop {
    pub half_edges: Vec<HalfEdgeId>,
    pub face: FaceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    /// Carrier plane; its normal points out of the solid.
    pub plane: Plane,
    pub outer_loop: LoopId,
    pub shell: ShellId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub faces: Vec<FaceId>,
    pub solid: SolidId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solid {
    pub shells: Vec<ShellId>,
}

// ─── Entity Store ────────────────────────────────────────────────────────────

/// Arena-based storage for all topological entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub edges: SlotMap<EdgeId, Edge>,
    pub half_edges: SlotMap<HalfEdgeId, HalfEdge>,
    pub loops: SlotMap<LoopId, Loop>,
    pub faces: SlotMap<FaceId, Face>,
    pub shells: SlotMap<ShellId, Shell>,
    pub solids: SlotMap<SolidId, Solid>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count topological entities for a shell: (vertices, edges, faces).
    pub fn count_topology(&self, shell_id: ShellId) -> (usize, usize, usize) {
        let shell = &self.shells[shell_id];

        let mut edge_set = HashSet::new();
        let mut vertex_set = HashSet::new();
        for &face_id in &shell.faces {
            let loop_data = &self.loops[self.faces[face_id].outer_loop];
            for &he_id in &loop_data.half_edges {
                let he = &self.half_edges[he_id];
                edge_set.insert(he.edge);
                vertex_set.insert(he.start_vertex);
                vertex_set.insert(he.end_vertex);
            }
        }

        (vertex_set.len(), edge_set.len(), shell.faces.len())
    }

    /// Vertex positions of a face's outer loop, in loop order.
    pub fn face_points(&self, face_id: FaceId) -> Vec<Point3d> {
        let loop_data = &self.loops[self.faces[face_id].outer_loop];
        loop_data
            .half_edges
            .iter()
            .map(|&he_id| self.vertices[self.half_edges[he_id].start_vertex].point)
            .collect()
    }

    /// All faces of a solid across its shells.
    pub fn solid_faces(&self, solid_id: SolidId) -> Vec<FaceId> {
        self.solids[solid_id]
            .shells
            .iter()
            .flat_map(|&shell_id| self.shells[shell_id].faces.iter().copied())
            .collect()
    }

    /// Distinct vertex positions of a solid.
    pub fn solid_points(&self, solid_id: SolidId) -> Vec<Point3d> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for face_id in self.solid_faces(solid_id) {
            let loop_data = &self.loops[self.faces[face_id].outer_loop];
            for &he_id in &loop_data.half_edges {
                let v = self.half_edges[he_id].start_vertex;
                if seen.insert(v) {
                    points.push(self.vertices[v].point);
                }
            }
        }
        points
    }

    /// Compute axis-aligned bounding box for a solid.
    pub fn solid_bounding_box(&self, solid_id: SolidId) -> BoundingBox {
        BoundingBox::from_points(&self.solid_points(solid_id))
    }

    /// Enclosed volume from the divergence theorem over fan-triangulated
    /// faces. Positive when face loops wind counter-clockwise seen from
    /// outside.
    pub fn solid_volume(&self, solid_id: SolidId) -> f64 {
        self.solid_faces(solid_id)
            .into_iter()
            .map(|face_id| {
                let pts = self.face_points(face_id);
                let mut sum = 0.0;
                for i in 1..pts.len().saturating_sub(1) {
                    sum += pts[0].to_vec3().triple(&pts[i].to_vec3(), &pts[i + 1].to_vec3());
                }
                sum / 6.0
            })
            .sum()
    }

    /// Outward normal of a face.
    pub fn face_normal(&self, face_id: FaceId) -> Vec3 {
        self.faces[face_id].plane.normal
    }
}

// ─── Topology Audit ─────────────────────────────────────────────────────────

/// Result of a topological consistency check.
#[derive(Debug, Clone)]
pub struct TopologyAudit {
    pub euler_valid: bool,
    pub all_edges_two_faced: bool,
    pub all_faces_closed: bool,
    pub normals_consistent: bool,
    pub errors: Vec<TopologyError>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TopologyError {
    #[error("shell {shell:?} has V-E+F = {actual_chi}, expected 2 (V={v}, E={e}, F={f})")]
    EulerViolation {
        shell: ShellId,
        v: usize,
        e: usize,
        f: usize,
        actual_chi: i64,
    },
    #[error("loop {loop_id:?} is not closed")]
    OpenLoop { loop_id: LoopId },
    #[error("half-edge {half_edge:?} has an inconsistent twin")]
    HalfEdgeTwinMismatch { half_edge: HalfEdgeId },
    #[error("face {face:?} normal disagrees with its loop winding")]
    FlippedFace { face: FaceId },
    #[error("solid encloses non-positive volume {volume}")]
    InvertedSolid { volume: f64 },
}

impl TopologyAudit {
    pub fn all_valid(&self) -> bool {
        self.euler_valid && self.all_edges_two_faced && self.all_faces_closed && self.normals_consistent
    }
}

/// Perform a full topology audit on a solid.
pub fn audit_solid(store: &EntityStore, solid_id: SolidId) -> TopologyAudit {
    let solid = &store.solids[solid_id];
    let mut errors = Vec::new();
    let mut euler_valid = true;
    let mut all_faces_closed = true;
    let mut all_edges_two_faced = true;
    let mut normals_consistent = true;

    for &shell_id in &solid.shells {
        // Euler-Poincaré: V - E + F = 2 for genus-0 closed shells
        let (v, e, f) = store.count_topology(shell_id);
        let chi = v as i64 - e as i64 + f as i64;
        if chi != 2 {
            euler_valid = false;
            errors.push(TopologyError::EulerViolation {
                shell: shell_id,
                v,
                e,
                f,
                actual_chi: chi,
            });
        }

        for &face_id in &store.shells[shell_id].faces {
            let face = &store.faces[face_id];
            if !is_loop_closed(store, face.outer_loop) {
                all_faces_closed = false;
                errors.push(TopologyError::OpenLoop {
                    loop_id: face.outer_loop,
                });
            }

            for &he_id in &store.loops[face.outer_loop].half_edges {
                let he = &store.half_edges[he_id];
                let twin_ok = store
                    .half_edges
                    .get(he.twin)
                    .is_some_and(|twin| twin.twin == he_id && twin.face != he.face);
                if !twin_ok {
                    all_edges_two_faced = false;
                    errors.push(TopologyError::HalfEdgeTwinMismatch { half_edge: he_id });
                }
            }

            let winding = newell_normal(&store.face_points(face_id));
            if winding.dot(&face.plane.normal) < 0.0 {
                normals_consistent = false;
                errors.push(TopologyError::FlippedFace { face: face_id });
            }
        }
    }

    let volume = store.solid_volume(solid_id);
    if volume <= 0.0 {
        normals_consistent = false;
        errors.push(TopologyError::InvertedSolid { volume });
    }

    TopologyAudit {
        euler_valid,
        all_edges_two_faced,
        all_faces_closed,
        normals_consistent,
        errors,
    }
}

fn is_loop_closed(store: &EntityStore, loop_id: LoopId) -> bool {
    let half_edges = &store.loops[loop_id].half_edges;
    let (Some(&first), Some(&last)) = (half_edges.first(), half_edges.last()) else {
        return false;
    };
    store.half_edges[first].start_vertex == store.half_edges[last].end_vertex
}

/// Area-weighted polygon normal (Newell's method). Not normalized.
pub fn newell_normal(points: &[Point3d]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n
}
