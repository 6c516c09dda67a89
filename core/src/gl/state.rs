//! Per-kind handle tables owned alongside the backend

use super::GraphicsBackend;
use crate::handles::HandleTable;

/// Graphics backend and the handle tables for every resource kind
///
/// Each kind has its own table, so a handle is only ever resolved against
/// the kind it was created for.
pub struct GlState<B: GraphicsBackend> {
    pub backend: B,
    pub shaders: HandleTable<B::Shader>,
    pub programs: HandleTable<B::Program>,
    pub buffers: HandleTable<B::Buffer>,
    pub textures: HandleTable<B::Texture>,
    pub framebuffers: HandleTable<B::Framebuffer>,
    pub vertex_arrays: HandleTable<B::VertexArray>,
    /// `None` entries are locations the backend did not find; setting them is a no-op
    pub uniform_locations: HandleTable<Option<B::UniformLocation>>,
}

impl<B: GraphicsBackend> GlState<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            shaders: HandleTable::new("shader"),
            programs: HandleTable::new("program"),
            buffers: HandleTable::new("buffer"),
            textures: HandleTable::new("texture"),
            framebuffers: HandleTable::new("framebuffer"),
            vertex_arrays: HandleTable::new("vertex array"),
            uniform_locations: HandleTable::new("uniform location"),
        }
    }

    /// Live object counts, for diagnostics
    pub fn live_counts(&self) -> [(&'static str, usize); 7] {
        [
            (self.shaders.kind(), self.shaders.live()),
            (self.programs.kind(), self.programs.live()),
            (self.buffers.kind(), self.buffers.live()),
            (self.textures.kind(), self.textures.live()),
            (self.framebuffers.kind(), self.framebuffers.live()),
            (self.vertex_arrays.kind(), self.vertex_arrays.live()),
            (
                self.uniform_locations.kind(),
                self.uniform_locations.live(),
            ),
        ]
    }
}
