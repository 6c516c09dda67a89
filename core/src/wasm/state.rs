//! Store data shared by every host function

use crate::assets::AssetTable;
use crate::gl::{GlState, GraphicsBackend};
use crate::memory::LinearMemory;
use crate::storage::StorageBridge;

/// Everything host functions can reach from a `Caller`
///
/// One context per module instance. Nothing here is global, so independent
/// instances (and tests) never share handle tables or storage.
pub struct HostContext<B: GraphicsBackend> {
    /// Exported linear memory (set after instantiation)
    pub memory: Option<LinearMemory>,

    /// Graphics backend and per-kind handle tables
    pub gl: GlState<B>,

    /// Asset placements, filled in once at load
    pub assets: AssetTable,

    /// Named byte-blob storage
    pub storage: StorageBridge,
}

impl<B: GraphicsBackend> HostContext<B> {
    pub fn new(backend: B, storage: StorageBridge) -> Self {
        Self {
            memory: None,
            gl: GlState::new(backend),
            assets: AssetTable::new(),
            storage,
        }
    }
}
