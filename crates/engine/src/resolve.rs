use std::collections::HashMap;
use std::sync::Arc;

use canopy_tessellation::TriangleMesh;
use tracing::warn;

/// Source of externally modelled meshes, such as carved braces.
///
/// Meshes are in member-local coordinates: X along the axis and centered on
/// its midpoint, the section hanging below the axis in -Y and centered on Z.
/// `None` means the caller builds the procedural box instead.
pub trait MeshResolver {
    fn resolve(&self, key: &str) -> Option<Arc<TriangleMesh>>;
}

/// Resolver without assets; everything is built procedurally.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralOnly;

impl MeshResolver for ProceduralOnly {
    fn resolve(&self, _key: &str) -> Option<Arc<TriangleMesh>> {
        None
    }
}

/// Resolver over meshes loaded ahead of time.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAssets {
    meshes: HashMap<String, Arc<TriangleMesh>>,
}

impl ResolvedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, mesh: TriangleMesh) {
        self.meshes.insert(key.into(), Arc::new(mesh));
    }

    pub fn with(mut self, key: impl Into<String>, mesh: TriangleMesh) -> Self {
        self.insert(key, mesh);
        self
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl MeshResolver for ResolvedAssets {
    fn resolve(&self, key: &str) -> Option<Arc<TriangleMesh>> {
        let mesh = self.meshes.get(key).cloned();
        if mesh.is_none() {
            warn!(key, "no asset loaded, falling back to procedural geometry");
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_only_resolves_nothing() {
        assert!(ProceduralOnly.resolve("brace-1").is_none());
    }

    #[test]
    fn test_resolved_assets_lookup() {
        let assets = ResolvedAssets::new().with("brace-2", TriangleMesh::new());
        assert_eq!(assets.len(), 1);
        assert!(assets.resolve("brace-2").is_some());
        assert!(assets.resolve("brace-3").is_none());
    }
}
