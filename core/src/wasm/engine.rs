//! WASM engine wrapper for loading and compiling modules

use anyhow::{Context, Result, bail};
use wasmtime::{Engine, ExternType, Module};

/// Shared WASM engine (one per application)
pub struct WasmEngine {
    engine: Engine,
}

impl WasmEngine {
    /// Create a new WASM engine with default configuration
    pub fn new() -> Result<Self> {
        let engine = Engine::default();
        Ok(Self { engine })
    }

    /// Get a reference to the underlying wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Load a WASM module from bytes
    pub fn load_module(&self, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).context("Failed to compile WASM module")
    }

    /// Check that a module exports the 32-bit linear memory the host
    /// marshals through
    pub fn validate_module_memory(module: &Module) -> Result<()> {
        for export in module.exports() {
            if export.name() != "memory" {
                continue;
            }
            let ExternType::Memory(mem_type) = export.ty() else {
                bail!("Module export 'memory' is not a memory");
            };
            if mem_type.is_64() {
                bail!("Module memory is 64-bit; only 32-bit linear memory is supported");
            }
            if mem_type.maximum().is_some() {
                tracing::debug!(
                    maximum_pages = mem_type.maximum(),
                    "Module memory declares a maximum; asset growth may fail"
                );
            }
            return Ok(());
        }
        bail!("Module does not export 'memory'")
    }
}
