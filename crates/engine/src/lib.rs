//! Parametric canopy engine: parameters in, a generation of role-tagged
//! meshes out.

pub mod cache;
pub mod layout;
pub mod rebuild;
pub mod resolve;
pub mod types;

use tracing::info;

use crate::cache::GeometryCache;
use crate::resolve::{MeshResolver, ProceduralOnly};
use crate::types::{CanopyParams, EngineError, Generation};

/// Receiver of finished generations, typically a renderer's scene graph.
pub trait SceneSink {
    /// Replace whatever was shown with `generation`.
    fn apply(&mut self, generation: &Generation);
}

impl<F: FnMut(&Generation)> SceneSink for F {
    fn apply(&mut self, generation: &Generation) {
        self(generation)
    }
}

/// The canopy engine.
///
/// Holds the current parameters, the geometry cache, the scene sink and the
/// last generation it delivered.
pub struct Engine {
    params: Option<CanopyParams>,
    cache: GeometryCache,
    resolver: Box<dyn MeshResolver>,
    sink: Option<Box<dyn SceneSink>>,
    current: Option<Generation>,
    next_id: u64,
}

impl Engine {
    /// Create an engine that builds everything procedurally.
    pub fn new() -> Self {
        Self::with_resolver(Box::new(ProceduralOnly))
    }

    pub fn with_resolver(resolver: Box<dyn MeshResolver>) -> Self {
        Self {
            params: None,
            cache: GeometryCache::new(),
            resolver,
            sink: None,
            current: None,
            next_id: 0,
        }
    }

    pub fn set_params(&mut self, params: CanopyParams) {
        self.params = Some(params);
    }

    /// Parse and store parameters from JSON.
    pub fn load_params_json(&mut self, json: &str) -> Result<(), EngineError> {
        self.params = Some(CanopyParams::from_json(json)?);
        Ok(())
    }

    pub fn params(&self) -> Option<&CanopyParams> {
        self.params.as_ref()
    }

    pub fn attach_scene(&mut self, sink: Box<dyn SceneSink>) {
        self.sink = Some(sink);
    }

    pub fn detach_scene(&mut self) -> Option<Box<dyn SceneSink>> {
        self.sink.take()
    }

    /// Rebuild from the current parameters and hand the new generation to
    /// the scene in one call. On error the previous generation stays
    /// current and the scene is not touched.
    pub fn rebuild(&mut self) -> Result<&Generation, EngineError> {
        let params = self.params.as_ref().ok_or(EngineError::MissingParameters)?;
        let sink = self.sink.as_mut().ok_or(EngineError::NoSceneAttached)?;

        let mut generation = rebuild::rebuild(params, &mut self.cache, self.resolver.as_ref())?;
        self.next_id += 1;
        generation.id = self.next_id;
        sink.apply(&generation);
        self.cache.sweep();
        info!(id = generation.id, solids = generation.len(), "generation applied");
        Ok(&*self.current.insert(generation))
    }

    /// The last generation delivered to the scene.
    pub fn current(&self) -> Option<&Generation> {
        self.current.as_ref()
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut GeometryCache {
        &mut self.cache
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
