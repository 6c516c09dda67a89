//! Named byte-blob storage exposed to the module
//!
//! Values persist in a JSON document mapping names to base64 strings when a
//! writable data directory is available. Otherwise the bridge keeps them in
//! memory for the lifetime of the process; the module cannot tell the two
//! apart except that in-memory values do not survive a restart.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hashbrown::HashMap;
use thiserror::Error;

/// Errors from the durable storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage document could not be encoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage path {0} has no file name")]
    InvalidPath(PathBuf),
}

/// Outcome of reading a value into a fixed-capacity destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageGet {
    /// No value under that name
    Absent,
    /// The value fits; these are its bytes
    Fits(Vec<u8>),
    /// The value is this many bytes, more than the destination holds
    TooLarge(usize),
}

/// Process-lifetime storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.get(name).cloned()
    }

    pub fn set_item(&mut self, name: &str, value: &[u8]) {
        self.entries.insert(name.to_string(), value.to_vec());
    }
}

/// File-backed storage with base64-encoded values
#[derive(Debug)]
pub struct DurableStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl DurableStorage {
    /// Open the document at `path`.
    ///
    /// A missing file starts empty. A file that cannot be parsed is treated
    /// as empty and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Discarding corrupt storage file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, name: &str) -> Option<Vec<u8>> {
        let encoded = self.entries.get(name)?;
        match STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(name, error = %e, "Stored value is not valid base64");
                None
            }
        }
    }

    /// Store a value and write the whole document back to disk
    pub fn set_item(&mut self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        self.entries
            .insert(name.to_string(), STANDARD.encode(value));
        self.flush()
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = match self.path.file_name() {
            Some(name) => {
                let mut tmp_name = OsString::from(name);
                tmp_name.push(".tmp");
                self.path.with_file_name(tmp_name)
            }
            None => return Err(StorageError::InvalidPath(self.path.clone())),
        };

        let out = serde_json::to_vec_pretty(&self.entries)?;
        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&out)?;
            f.sync_all()?;
        }

        #[cfg(windows)]
        {
            if self.path.exists() {
                // Windows rename fails if destination exists.
                fs::remove_file(&self.path)?;
            }
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// The storage the module sees, durable or in-memory
#[derive(Debug)]
pub enum StorageBridge {
    Durable(DurableStorage),
    Memory(MemoryStorage),
}

impl Default for StorageBridge {
    fn default() -> Self {
        StorageBridge::Memory(MemoryStorage::new())
    }
}

impl StorageBridge {
    /// Open durable storage at `path`, falling back to memory when it is unusable
    pub fn open_or_memory(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            tracing::info!("No storage path available; using in-memory storage");
            return Self::default();
        };
        match DurableStorage::open(&path) {
            Ok(storage) => {
                tracing::info!(path = %storage.path().display(), "Using durable storage");
                StorageBridge::Durable(storage)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Durable storage unavailable; using in-memory storage");
                Self::default()
            }
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, StorageBridge::Durable(_))
    }

    pub fn get_item(&self, name: &str) -> Option<Vec<u8>> {
        match self {
            StorageBridge::Durable(storage) => storage.get_item(name),
            StorageBridge::Memory(storage) => storage.get_item(name),
        }
    }

    /// Store a value. Write failures are logged; the value stays readable for
    /// the rest of the session.
    pub fn set_item(&mut self, name: &str, value: &[u8]) {
        match self {
            StorageBridge::Durable(storage) => {
                if let Err(e) = storage.set_item(name, value) {
                    tracing::warn!(name, error = %e, "Failed to persist storage entry");
                }
            }
            StorageBridge::Memory(storage) => storage.set_item(name, value),
        }
    }

    /// Look up a value for a destination holding at most `capacity` bytes
    pub fn get_into(&self, name: &str, capacity: usize) -> StorageGet {
        match self.get_item(name) {
            None => StorageGet::Absent,
            Some(value) if value.len() > capacity => StorageGet::TooLarge(value.len()),
            Some(value) => StorageGet::Fits(value),
        }
    }
}
