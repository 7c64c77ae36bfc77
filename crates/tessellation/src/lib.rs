use canopy_kernel::geometry::point::Point3d;
use canopy_kernel::geometry::transform::BoundingBox;
use canopy_kernel::geometry::vector::Vec3;
use canopy_kernel::topology::brep::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A triangle mesh for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals [nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices [i0, i1, i2, ...]
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn add_vertex(&mut self, pos: Point3d, normal: Vec3) -> u32 {
        let idx = self.vertex_count() as u32;
        self.positions.extend([pos.x as f32, pos.y as f32, pos.z as f32]);
        self.normals
            .extend([normal.x as f32, normal.y as f32, normal.z as f32]);
        idx
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend([i0, i1, i2]);
    }

    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&idx| idx + offset));
    }

    pub fn vertex(&self, index: usize) -> Point3d {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3d::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let points: Vec<Point3d> = (0..self.vertex_count()).map(|i| self.vertex(i)).collect();
        BoundingBox::from_points(&points)
    }
}

/// Tessellate a single planar face into triangles using fan triangulation.
///
/// Every framing face is a convex quad, so a fan from the first vertex is
/// exact.
pub fn tessellate_planar_face(store: &EntityStore, face_id: FaceId) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let vertices = store.face_points(face_id);
    if vertices.len() < 3 {
        return mesh;
    }

    let normal = store.face_normal(face_id);
    let base_idx: Vec<u32> = vertices
        .iter()
        .map(|p| mesh.add_vertex(*p, normal))
        .collect();

    for i in 1..(vertices.len() - 1) {
        mesh.add_triangle(base_idx[0], base_idx[i], base_idx[i + 1]);
    }

    mesh
}

/// Tessellate an entire solid into a triangle mesh.
pub fn tessellate_solid(store: &EntityStore, solid_id: SolidId) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for face_id in store.solid_faces(solid_id) {
        mesh.merge(&tessellate_planar_face(store, face_id));
    }
    mesh
}

/// Tessellate several solids into one mesh (one draw batch per role).
#[instrument(skip(store, solids), fields(count = solids.len()))]
pub fn tessellate_solids(store: &EntityStore, solids: &[SolidId]) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for &solid_id in solids {
        mesh.merge(&tessellate_solid(store, solid_id));
    }
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "tessellated solids"
    );
    mesh
}
