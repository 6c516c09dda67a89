//! Linear memory view
//!
//! The module owns its linear memory; the host only observes it through a
//! [`LinearMemory`] handle. Every access is bounds-checked against the
//! *current* memory size and copies data in or out, so no borrowed view can
//! outlive a call that might grow the memory.

use std::ops::Range;

use thiserror::Error;
use wasmtime::{AsContextMut, Memory, StoreContext, StoreContextMut};

/// WASM page size (64 KiB)
pub const WASM_PAGE_SIZE: u64 = 64 * 1024;

/// Errors raised by linear memory accesses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The requested range does not lie inside the current buffer
    #[error("memory access ({len} bytes at {ptr}) exceeds bounds ({size})")]
    OutOfBounds { ptr: u32, len: u64, size: usize },

    /// The requested range is not valid UTF-8
    #[error("string at {ptr} ({len} bytes) is not valid UTF-8")]
    InvalidUtf8 { ptr: u32, len: u32 },

    /// The module memory refused to grow
    #[error("failed to grow memory by {pages} pages: {reason}")]
    GrowFailed { pages: u64, reason: String },
}

/// Resolve `[ptr, ptr + len)` against a buffer of `size` bytes.
///
/// Overflowing ranges are reported as out of bounds.
pub fn checked_range(size: usize, ptr: u32, len: u64) -> Result<Range<usize>, MemoryError> {
    let start = ptr as u64;
    let end = start.checked_add(len);
    match end {
        Some(end) if end <= size as u64 => Ok(start as usize..end as usize),
        _ => Err(MemoryError::OutOfBounds { ptr, len, size }),
    }
}

/// Decode little-endian `u16` elements (a trailing odd byte is ignored)
pub fn le_u16s(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Decode little-endian `f32` elements
pub fn le_f32s(bytes: &[u8]) -> Vec<f32> {
    match bytemuck::try_cast_slice::<u8, f32>(bytes) {
        // Aligned fast path; wasm memory is little-endian like every host we target
        Ok(floats) if cfg!(target_endian = "little") => floats.to_vec(),
        _ => bytes
            .chunks_exact(4)
            .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
            .collect(),
    }
}

/// Host-side handle to the module's exported linear memory
#[derive(Debug, Clone, Copy)]
pub struct LinearMemory {
    memory: Memory,
}

impl LinearMemory {
    pub fn new(memory: Memory) -> Self {
        Self { memory }
    }

    /// Current size in bytes
    pub fn byte_len<'a, T: 'static>(&self, store: impl Into<StoreContext<'a, T>>) -> usize {
        self.memory.data(store).len()
    }

    /// Copy `len` bytes starting at `ptr` out of memory
    pub fn read_bytes<'a, T: 'static>(
        &self,
        store: impl Into<StoreContext<'a, T>>,
        ptr: u32,
        len: u32,
    ) -> Result<Vec<u8>, MemoryError> {
        let data = self.memory.data(store);
        let range = checked_range(data.len(), ptr, len as u64)?;
        Ok(data[range].to_vec())
    }

    /// Decode `[ptr, ptr + len)` as UTF-8
    pub fn read_str<'a, T: 'static>(
        &self,
        store: impl Into<StoreContext<'a, T>>,
        ptr: u32,
        len: u32,
    ) -> Result<String, MemoryError> {
        let bytes = self.read_bytes(store, ptr, len)?;
        String::from_utf8(bytes).map_err(|_| MemoryError::InvalidUtf8 { ptr, len })
    }

    /// Decode `[ptr, ptr + len)` as UTF-8, replacing invalid sequences
    pub fn read_str_lossy<'a, T: 'static>(
        &self,
        store: impl Into<StoreContext<'a, T>>,
        ptr: u32,
        len: u32,
    ) -> Result<String, MemoryError> {
        let bytes = self.read_bytes(store, ptr, len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read `count` little-endian floats starting at `ptr`
    pub fn read_f32s<'a, T: 'static>(
        &self,
        store: impl Into<StoreContext<'a, T>>,
        ptr: u32,
        count: u32,
    ) -> Result<Vec<f32>, MemoryError> {
        let data = self.memory.data(store);
        let range = checked_range(data.len(), ptr, count as u64 * 4)?;
        Ok(le_f32s(&data[range]))
    }

    /// Read `count` little-endian `u16` elements starting at `ptr`
    pub fn read_u16s<'a, T: 'static>(
        &self,
        store: impl Into<StoreContext<'a, T>>,
        ptr: u32,
        count: u32,
    ) -> Result<Vec<u16>, MemoryError> {
        let data = self.memory.data(store);
        let range = checked_range(data.len(), ptr, count as u64 * 2)?;
        Ok(le_u16s(&data[range]))
    }

    /// Copy `bytes` into memory starting at `ptr`
    pub fn write_bytes<'a, T: 'static>(
        &self,
        store: impl Into<StoreContextMut<'a, T>>,
        ptr: u32,
        bytes: &[u8],
    ) -> Result<(), MemoryError> {
        let data = self.memory.data_mut(store);
        let range = checked_range(data.len(), ptr, bytes.len() as u64)?;
        data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Write a little-endian `u32` out-parameter
    pub fn write_u32<'a, T: 'static>(
        &self,
        store: impl Into<StoreContextMut<'a, T>>,
        ptr: u32,
        value: u32,
    ) -> Result<(), MemoryError> {
        self.write_bytes(store, ptr, &value.to_le_bytes())
    }

    /// Append `pages` whole pages and return the byte length before growth.
    ///
    /// Growth invalidates every slice previously taken from the memory.
    pub fn grow(&self, mut store: impl AsContextMut, pages: u64) -> Result<u64, MemoryError> {
        let previous_pages = self
            .memory
            .grow(&mut store, pages)
            .map_err(|e| MemoryError::GrowFailed {
                pages,
                reason: e.to_string(),
            })?;
        Ok(previous_pages * WASM_PAGE_SIZE)
    }
}
