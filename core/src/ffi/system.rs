//! Seed and logging FFI functions

use rand::Rng;
use wasmtime::Caller;

use super::helpers::get_memory;
use crate::gl::GraphicsBackend;
use crate::wasm::HostContext;

/// Fresh seed for the module's own RNG, uniform in `[0, 2^31 - 1)`
pub(super) fn get_random_seed<B: GraphicsBackend>(_caller: Caller<'_, HostContext<B>>) -> i32 {
    rand::rng().random_range(0..i32::MAX)
}

/// Log a message from WASM
///
/// Invalid UTF-8 is replaced rather than rejected; a bad range is dropped
/// with a warning.
pub(super) fn console_log<B: GraphicsBackend>(
    caller: Caller<'_, HostContext<B>>,
    ptr: u32,
    len: u32,
) {
    let msg = get_memory(&caller, "consoleLog").and_then(|memory| {
        memory
            .read_str_lossy(&caller, ptr, len)
            .map_err(anyhow::Error::from)
    });
    match msg {
        Ok(msg) => tracing::info!("[GAME] {}", msg),
        Err(e) => tracing::warn!("consoleLog: {:#}", e),
    }
}
