//! Oxid Host Core - host bindings for the Oxid game module
//!
//! This crate embeds the compiled game with wasmtime and supplies everything
//! it imports: a WebGL-style graphics proxy, asset and storage lookups, audio
//! and input plumbing.
//!
//! # Architecture
//!
//! - [`memory`] / [`handles`] - Marshaling primitives shared by every import
//! - [`ffi`] - Host functions registered under `env`
//! - [`GraphicsBackend`], [`AudioPlatform`], [`Display`] - Platform ports
//! - [`Host`] - Load, init and event loop around a [`GameInstance`]

pub mod assets;
pub mod audio;
pub mod capabilities;
pub mod config;
pub mod display;
pub mod fetch;
pub mod ffi;
pub mod gl;
pub mod handles;
pub mod host;
#[cfg(test)]
mod integration;
pub mod memory;
pub mod router;
pub mod storage;
#[cfg(test)]
pub mod test_utils;
pub mod wasm;

pub use audio::{AudioBridge, AudioPlatform, AudioSession, AudioState, NullAudioPlatform};
pub use capabilities::PlatformCapabilities;
pub use config::HostConfig;
pub use display::{Display, DisplayEvent, HeadlessDisplay};
pub use fetch::{Bundle, FetchError, Location, fetch_bundle};
pub use gl::{GraphicsBackend, HeadlessGl};
pub use handles::{HandleError, HandleTable, NULL_HANDLE};
pub use host::Host;
pub use memory::{LinearMemory, MemoryError};
pub use router::{KeyCommand, Router};
pub use storage::{StorageBridge, StorageError, StorageGet};
pub use wasm::{GameExports, GameInstance, HostContext, WasmEngine};
