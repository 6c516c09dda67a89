//! Index-stable handle tables
//!
//! The module refers to host-owned graphics objects by small integer handles.
//! A handle is the position of the object in its table. Deleting an object
//! leaves a tombstone in its slot, so handles are never compacted or reused.

use std::fmt;

use thiserror::Error;

/// Handle value meaning "no object" (`-1` when viewed as an `i32`)
///
/// Only accepted where the graphics API itself accepts a null object, such
/// as binding the default framebuffer.
pub const NULL_HANDLE: u32 = u32::MAX;

/// Failed handle resolution. Always indicates host/module protocol drift.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("invalid {kind} handle {handle} (only {len} allocated)")]
    OutOfRange {
        kind: &'static str,
        handle: u32,
        len: usize,
    },
    #[error("{kind} handle {handle} was deleted")]
    Deleted { kind: &'static str, handle: u32 },
}

/// Ordered table of native objects addressed by position
///
/// `None` slots are tombstones left by deletion.
pub struct HandleTable<T> {
    kind: &'static str,
    slots: Vec<Option<T>>,
}

impl<T> HandleTable<T> {
    /// Create an empty table; `kind` names the resource in error messages
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Append an object and return its handle
    pub fn insert(&mut self, object: T) -> u32 {
        self.slots.push(Some(object));
        (self.slots.len() - 1) as u32
    }

    /// Resolve a handle to its live object
    pub fn get(&self, handle: u32) -> Result<&T, HandleError> {
        match self.slots.get(handle as usize) {
            Some(Some(object)) => Ok(object),
            Some(None) => Err(HandleError::Deleted {
                kind: self.kind,
                handle,
            }),
            None => Err(HandleError::OutOfRange {
                kind: self.kind,
                handle,
                len: self.slots.len(),
            }),
        }
    }

    /// Resolve a handle, mapping [`NULL_HANDLE`] to `None`
    pub fn get_nullable(&self, handle: u32) -> Result<Option<&T>, HandleError> {
        if handle == NULL_HANDLE {
            return Ok(None);
        }
        self.get(handle).map(Some)
    }

    /// Tombstone a slot and hand the object back for native release
    pub fn remove(&mut self, handle: u32) -> Result<T, HandleError> {
        let len = self.slots.len();
        match self.slots.get_mut(handle as usize) {
            Some(slot) => slot.take().ok_or(HandleError::Deleted {
                kind: self.kind,
                handle,
            }),
            None => Err(HandleError::OutOfRange {
                kind: self.kind,
                handle,
                len,
            }),
        }
    }

    /// Number of slots ever allocated (live and deleted)
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Number of live objects
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> fmt::Debug for HandleTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("kind", &self.kind)
            .field("allocated", &self.allocated())
            .field("live", &self.live())
            .finish()
    }
}
