use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use canopy_tessellation::TriangleMesh;
use tracing::debug;

/// Tessellated meshes keyed by the dimensions that produced them.
///
/// Entries are only ever inserted on a miss and never mutated, so a mesh
/// handed out once stays valid for every generation that holds it. Keys
/// looked up since the last [`GeometryCache::sweep`] are remembered so that
/// stale dimensions can be dropped.
#[derive(Debug, Default)]
pub struct GeometryCache {
    meshes: HashMap<String, Arc<TriangleMesh>>,
    used: HashSet<String>,
    hits: usize,
    misses: usize,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh under `key`, building and inserting it on a miss.
    pub fn get_or_insert_with(
        &mut self,
        key: String,
        build: impl FnOnce() -> TriangleMesh,
    ) -> Arc<TriangleMesh> {
        if let Some(mesh) = self.meshes.get(&key) {
            self.hits += 1;
            debug!(%key, "cache hit");
            let mesh = Arc::clone(mesh);
            self.used.insert(key);
            return mesh;
        }
        self.misses += 1;
        debug!(%key, "cache miss");
        let mesh = Arc::new(build());
        self.meshes.insert(key.clone(), Arc::clone(&mesh));
        self.used.insert(key);
        mesh
    }

    pub fn get(&self, key: &str) -> Option<Arc<TriangleMesh>> {
        self.meshes.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Drop every entry not looked up since the previous sweep and start a
    /// new round. Returns how many entries were dropped.
    pub fn sweep(&mut self) -> usize {
        let before = self.meshes.len();
        let used = std::mem::take(&mut self.used);
        self.meshes.retain(|key, _| used.contains(key));
        let dropped = before - self.meshes.len();
        if dropped > 0 {
            debug!(dropped, kept = self.meshes.len(), "cache swept");
        }
        dropped
    }

    /// Drop every entry. Meshes still held by a generation stay alive.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.used.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_kernel::geometry::point::Point3d;
    use canopy_kernel::geometry::vector::Vec3;

    fn triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let a = mesh.add_vertex(Point3d::ORIGIN, Vec3::Z);
        let b = mesh.add_vertex(Point3d::new(1.0, 0.0, 0.0), Vec3::Z);
        let c = mesh.add_vertex(Point3d::new(0.0, 1.0, 0.0), Vec3::Z);
        mesh.add_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_miss_then_hit_shares_mesh() {
        let mut cache = GeometryCache::new();
        let first = cache.get_or_insert_with("tri".into(), triangle);
        let second = cache.get_or_insert_with("tri".into(), || panic!("rebuilt a cached mesh"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_keeps_handed_out_meshes() {
        let mut cache = GeometryCache::new();
        let mesh = cache.get_or_insert_with("tri".into(), triangle);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("tri").is_none());
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_sweep_drops_unused_entries() {
        let mut cache = GeometryCache::new();
        cache.get_or_insert_with("old".into(), triangle);
        cache.get_or_insert_with("kept".into(), triangle);
        assert_eq!(cache.sweep(), 0);

        cache.get_or_insert_with("kept".into(), triangle);
        cache.get_or_insert_with("new".into(), triangle);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.get("old").is_none());
        assert!(cache.get("kept").is_some());
        assert_eq!(cache.len(), 2);
    }
}
