//! FFI helper functions for memory access
//!
//! Every helper copies data in or out of linear memory for the duration of a
//! single host call. Failures carry the calling function's name so a trap
//! points at the offending import.

use anyhow::{Context, Result};
use wasmtime::Caller;

use crate::gl::GraphicsBackend;
use crate::memory::LinearMemory;
use crate::wasm::HostContext;

/// Get the module's memory, failing if instantiation has not recorded it yet
#[inline]
pub(crate) fn get_memory<B: GraphicsBackend>(
    caller: &Caller<'_, HostContext<B>>,
    fn_name: &str,
) -> Result<LinearMemory> {
    caller
        .data()
        .memory
        .with_context(|| format!("{fn_name}: no WASM memory available"))
}

/// Copy `[ptr, ptr + len)` out of memory
pub(crate) fn read_wasm_bytes<B: GraphicsBackend>(
    caller: &Caller<'_, HostContext<B>>,
    ptr: u32,
    len: u32,
    fn_name: &str,
) -> Result<Vec<u8>> {
    let memory = get_memory(caller, fn_name)?;
    memory
        .read_bytes(caller, ptr, len)
        .with_context(|| format!("{fn_name}: invalid memory range"))
}

/// Decode `[ptr, ptr + len)` as UTF-8
pub(crate) fn read_wasm_str<B: GraphicsBackend>(
    caller: &Caller<'_, HostContext<B>>,
    ptr: u32,
    len: u32,
    fn_name: &str,
) -> Result<String> {
    let memory = get_memory(caller, fn_name)?;
    memory
        .read_str(caller, ptr, len)
        .with_context(|| format!("{fn_name}: invalid string argument"))
}

/// Read `count` little-endian floats starting at `ptr`
pub(crate) fn read_wasm_floats<B: GraphicsBackend>(
    caller: &Caller<'_, HostContext<B>>,
    ptr: u32,
    count: u32,
    fn_name: &str,
) -> Result<Vec<f32>> {
    let memory = get_memory(caller, fn_name)?;
    memory
        .read_f32s(caller, ptr, count)
        .with_context(|| format!("{fn_name}: invalid float array"))
}

/// Copy `bytes` into memory at `ptr`
pub(crate) fn write_wasm_bytes<B: GraphicsBackend>(
    caller: &mut Caller<'_, HostContext<B>>,
    ptr: u32,
    bytes: &[u8],
    fn_name: &str,
) -> Result<()> {
    let memory = get_memory(caller, fn_name)?;
    memory
        .write_bytes(caller, ptr, bytes)
        .with_context(|| format!("{fn_name}: invalid destination range"))
}

/// Write a little-endian `u32` out-parameter at `ptr`
pub(crate) fn write_wasm_u32<B: GraphicsBackend>(
    caller: &mut Caller<'_, HostContext<B>>,
    ptr: u32,
    value: u32,
    fn_name: &str,
) -> Result<()> {
    write_wasm_bytes(caller, ptr, &value.to_le_bytes(), fn_name)
}
