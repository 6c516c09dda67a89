//! Storage FFI functions

use anyhow::Result;
use wasmtime::Caller;

use super::helpers::{get_memory, read_wasm_bytes, read_wasm_str};
use crate::gl::GraphicsBackend;
use crate::memory::checked_range;
use crate::storage::StorageGet;
use crate::wasm::HostContext;

/// Store `value_len` bytes at `value_ptr` under the given name
pub(super) fn set_local_storage<B: GraphicsBackend>(
    mut caller: Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
    value_ptr: u32,
    value_len: u32,
) -> Result<()> {
    let name = read_wasm_str(&caller, name_ptr, name_len, "setLocalStorage")?;
    let value = read_wasm_bytes(&caller, value_ptr, value_len, "setLocalStorage")?;
    caller.data_mut().storage.set_item(&name, &value);
    Ok(())
}

/// Copy the value stored under a name into `[value_ptr, value_ptr + value_maxlen)`
///
/// Returns: byte length written, 0 if absent, -1 if the value does not fit
/// or the destination is out of bounds
pub(super) fn get_local_storage<B: GraphicsBackend>(
    mut caller: Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
    value_ptr: u32,
    value_maxlen: u32,
) -> Result<i32> {
    let name = read_wasm_str(&caller, name_ptr, name_len, "getLocalStorage")?;
    let memory = get_memory(&caller, "getLocalStorage")?;
    if let Err(e) = checked_range(memory.byte_len(&caller), value_ptr, value_maxlen as u64) {
        tracing::warn!(name = %name, "getLocalStorage: {}", e);
        return Ok(-1);
    }

    let value = match caller.data().storage.get_into(&name, value_maxlen as usize) {
        StorageGet::Absent => return Ok(0),
        StorageGet::TooLarge(len) => {
            tracing::warn!(
                name = %name,
                len,
                capacity = value_maxlen,
                "getLocalStorage: value does not fit destination"
            );
            return Ok(-1);
        }
        StorageGet::Fits(value) => value,
    };

    if let Err(e) = memory.write_bytes(&mut caller, value_ptr, &value) {
        tracing::warn!(name = %name, "getLocalStorage: {}", e);
        return Ok(-1);
    }
    Ok(value.len() as i32)
}
