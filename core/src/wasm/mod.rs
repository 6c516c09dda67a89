//! WASM runtime wrapper
//!
//! Provides abstractions over wasmtime for loading and driving the game module.
//!
//! # Key Types
//!
//! - [`WasmEngine`] - Shared WASM engine (one per application)
//! - [`GameInstance`] - Loaded and instantiated game
//! - [`HostContext`] - Store data every host function reaches through its `Caller`
//! - [`GameExports`] - Event entry points the host calls into

mod engine;
mod instance;
mod state;


use anyhow::Result;

pub use engine::WasmEngine;
pub use instance::GameInstance;
pub use state::HostContext;

/// Event entry points exported by the module
///
/// Implemented by [`GameInstance`]; the router and audio bridge only talk to
/// the module through this trait.
pub trait GameExports {
    /// Forward a key event. `None` means the module has no result to
    /// interpret (legacy `onKeyDown`/`onKeyUp` exports).
    fn on_key_event(&mut self, code: u32, pressed: bool) -> Result<Option<i32>>;

    fn on_animation_frame(&mut self, timestamp_ms: f64) -> Result<()>;

    fn on_fullscreen_change(&mut self, is_fullscreen: bool) -> Result<()>;

    fn on_canvas_scale_change(&mut self, scale: u32) -> Result<()>;

    fn on_sound_enabled_change(&mut self, enabled: bool) -> Result<()>;

    /// Samples per audio callback, or `None` if the module has no audio
    fn audio_buffer_size(&mut self) -> Result<Option<u32>>;

    /// Ask the module to fill its sample buffer and copy `sample_count` samples out
    fn audio_callback(&mut self, sample_rate: u32, sample_count: u32) -> Result<Vec<f32>>;
}
