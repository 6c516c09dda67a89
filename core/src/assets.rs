//! Asset placement in linear memory
//!
//! Assets are appended after the module's initial memory: the memory grows by
//! enough whole pages to hold all of them, then each asset is copied in
//! manifest order starting at the pre-growth end. The resulting
//! name -> (pointer, length) table is immutable for the session.

use anyhow::{Context, Result, bail};
use hashbrown::HashMap;
use wasmtime::AsContextMut;

use crate::memory::{LinearMemory, WASM_PAGE_SIZE};

/// Where an asset lives in linear memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRecord {
    pub ptr: u32,
    pub len: u32,
}

/// Name -> placement lookup queried by the module during initialization
#[derive(Debug, Default)]
pub struct AssetTable {
    records: HashMap<String, AssetRecord>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<AssetRecord> {
        self.records.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, name: String, record: AssetRecord) {
        self.records.insert(name, record);
    }
}

/// Computed placement for a set of assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    /// Pages to append to the memory
    pub pages: u64,
    /// Placement of each asset, in input order
    pub records: Vec<AssetRecord>,
}

/// Place assets of the given sizes sequentially from `base`
pub fn plan_layout(base: u64, sizes: &[usize]) -> Result<AssetLayout> {
    let total: u64 = sizes.iter().map(|&size| size as u64).sum();
    let pages = total.div_ceil(WASM_PAGE_SIZE);
    let end = base + pages * WASM_PAGE_SIZE;
    if end > 1 << 32 {
        bail!("Assets ({total} bytes at {base}) do not fit in 32-bit linear memory");
    }

    let mut records = Vec::with_capacity(sizes.len());
    let mut offset = base;
    for &size in sizes {
        records.push(AssetRecord {
            ptr: offset as u32,
            len: size as u32,
        });
        offset += size as u64;
    }

    Ok(AssetLayout { pages, records })
}

/// Grow `memory`, copy every asset in and record where it landed
pub fn install_assets(
    mut store: impl AsContextMut,
    memory: LinearMemory,
    assets: &[(String, Vec<u8>)],
) -> Result<AssetTable> {
    let base = memory.byte_len(store.as_context()) as u64;
    let sizes: Vec<usize> = assets.iter().map(|(_, bytes)| bytes.len()).collect();
    let layout = plan_layout(base, &sizes)?;

    let grown_from = memory
        .grow(&mut store, layout.pages)
        .context("Failed to grow memory for assets")?;
    debug_assert_eq!(grown_from, base);

    let mut table = AssetTable::new();
    for ((name, bytes), record) in assets.iter().zip(&layout.records) {
        memory
            .write_bytes(store.as_context_mut(), record.ptr, bytes)
            .with_context(|| format!("Failed to copy asset {name} into memory"))?;
        table.insert(name.clone(), *record);
    }

    tracing::info!(
        count = assets.len(),
        pages = layout.pages,
        base,
        "Installed assets into linear memory"
    );
    Ok(table)
}
