//! Asset lookup FFI functions

use anyhow::{Context, Result};
use wasmtime::Caller;

use super::helpers::{read_wasm_str, write_wasm_u32};
use crate::assets::AssetRecord;
use crate::gl::GraphicsBackend;
use crate::wasm::HostContext;

fn lookup<B: GraphicsBackend>(
    caller: &Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
    fn_name: &str,
) -> Result<(String, Option<AssetRecord>)> {
    let name = read_wasm_str(caller, name_ptr, name_len, fn_name)?;
    let record = caller.data().assets.get(&name);
    Ok((name, record))
}

/// Write an asset's pointer and length to the two out-params
///
/// Returns: 1 if found, 0 if no asset has that name
pub(super) fn get_asset<B: GraphicsBackend>(
    mut caller: Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
    out_ptr: u32,
    out_len: u32,
) -> Result<u32> {
    let (name, record) = lookup(&caller, name_ptr, name_len, "getAsset")?;
    let Some(record) = record else {
        tracing::warn!(name = %name, "getAsset: asset not found");
        return Ok(0);
    };
    write_wasm_u32(&mut caller, out_ptr, record.ptr, "getAsset")?;
    write_wasm_u32(&mut caller, out_len, record.len, "getAsset")?;
    Ok(1)
}

/// Pointer of a named asset; a missing asset traps
pub(super) fn get_asset_ptr<B: GraphicsBackend>(
    caller: Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
) -> Result<u32> {
    let (name, record) = lookup(&caller, name_ptr, name_len, "getAssetPtr")?;
    Ok(record
        .with_context(|| format!("getAssetPtr: asset not found: {name}"))?
        .ptr)
}

/// Length of a named asset; a missing asset traps
pub(super) fn get_asset_len<B: GraphicsBackend>(
    caller: Caller<'_, HostContext<B>>,
    name_ptr: u32,
    name_len: u32,
) -> Result<u32> {
    let (name, record) = lookup(&caller, name_ptr, name_len, "getAssetLen")?;
    Ok(record
        .with_context(|| format!("getAssetLen: asset not found: {name}"))?
        .len)
}
