//! Host functions imported by the module
//!
//! Everything lives in module `env`. Functions returning `Result` trap on
//! error: handle lookups, out-of-bounds marshaling and legacy asset lookups
//! are protocol violations the module cannot recover from.

mod assets;
mod gl;
pub(crate) mod helpers;
mod storage;
mod system;

#[cfg(test)]
mod tests;

use anyhow::Result;
use wasmtime::Linker;

use crate::gl::GraphicsBackend;
use crate::wasm::HostContext;

pub use gl::register_gl_ffi;

/// Register every host import with the linker
pub fn register_host_ffi<B: GraphicsBackend>(linker: &mut Linker<HostContext<B>>) -> Result<()> {
    // Graphics proxy
    register_gl_ffi(linker)?;

    // System functions
    linker.func_wrap("env", "getRandomSeed", system::get_random_seed)?;
    linker.func_wrap("env", "consoleLog", system::console_log)?;
    linker.func_wrap("env", "consoleLog_", system::console_log)?;

    // Storage functions
    linker.func_wrap("env", "setLocalStorage", storage::set_local_storage)?;
    linker.func_wrap("env", "getLocalStorage", storage::get_local_storage)?;
    linker.func_wrap("env", "setLocalStorage_", storage::set_local_storage)?;
    linker.func_wrap("env", "getLocalStorage_", storage::get_local_storage)?;

    // Asset functions
    linker.func_wrap("env", "getAsset", assets::get_asset)?;
    linker.func_wrap("env", "getAssetPtr_", assets::get_asset_ptr)?;
    linker.func_wrap("env", "getAssetLen_", assets::get_asset_len)?;

    Ok(())
}
