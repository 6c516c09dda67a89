//! Input and lifecycle routing
//!
//! Key events go to the module, whose integer result is decoded into a host
//! command. Fullscreen and canvas scale state are mirrored here and pushed
//! into the module whenever they change.

use anyhow::Result;

use crate::display::{Display, DisplayEvent};
use crate::wasm::GameExports;

/// Key result: handled, no host action
pub const RESULT_NOP: i32 = 1;
/// Key result: toggle sound
pub const RESULT_TOGGLE_SOUND: i32 = 2;
/// Key result: toggle fullscreen
pub const RESULT_TOGGLE_FULLSCREEN: i32 = 3;
/// Key results at or above this set the canvas scale to `result - RESULT_SET_CANVAS_SCALE`
pub const RESULT_SET_CANVAS_SCALE: i32 = 100;

/// Host command decoded from a key event result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    NoOp,
    ToggleSound,
    ToggleFullscreen,
    SetCanvasScale(u32),
    /// The module did not handle the key; default handling proceeds
    NotHandled,
}

impl KeyCommand {
    pub fn decode(result: i32) -> Self {
        match result {
            RESULT_NOP => KeyCommand::NoOp,
            RESULT_TOGGLE_SOUND => KeyCommand::ToggleSound,
            RESULT_TOGGLE_FULLSCREEN => KeyCommand::ToggleFullscreen,
            r if r >= RESULT_SET_CANVAS_SCALE => {
                KeyCommand::SetCanvasScale((r - RESULT_SET_CANVAS_SCALE) as u32)
            }
            _ => KeyCommand::NotHandled,
        }
    }

    /// Whether the platform's default handling of the key is suppressed
    pub fn prevents_default(self) -> bool {
        self != KeyCommand::NotHandled
    }
}

/// Mirrored fullscreen/scale state plus the fullscreen request latch
#[derive(Debug)]
pub struct Router {
    canvas_width: u32,
    canvas_height: u32,
    scale: u32,
    is_fullscreen: bool,
    fullscreen_waiting: bool,
    fullscreen_supported: bool,
}

impl Router {
    /// `canvas_width`/`canvas_height` are the logical canvas size
    pub fn new(canvas_width: u32, canvas_height: u32, fullscreen_supported: bool) -> Self {
        Self {
            canvas_width,
            canvas_height,
            scale: 1,
            is_fullscreen: false,
            fullscreen_waiting: false,
            fullscreen_supported,
        }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn fullscreen_waiting(&self) -> bool {
        self.fullscreen_waiting
    }

    /// Forward a key press and decode the module's answer
    pub fn key_down(&mut self, game: &mut impl GameExports, code: u32) -> Result<KeyCommand> {
        let command = match game.on_key_event(code, true)? {
            Some(result) => KeyCommand::decode(result),
            None => KeyCommand::NotHandled,
        };
        tracing::trace!(code, ?command, "key down");
        Ok(command)
    }

    /// Forward a key release. Releases never suppress default handling.
    pub fn key_up(&mut self, game: &mut impl GameExports, code: u32) -> Result<()> {
        game.on_key_event(code, false)?;
        Ok(())
    }

    /// Set the display scale and tell the module
    pub fn set_canvas_scale(
        &mut self,
        game: &mut impl GameExports,
        display: &mut impl Display,
        scale: u32,
    ) -> Result<()> {
        self.scale = scale;
        display.set_canvas_size(
            self.canvas_width.saturating_mul(scale),
            self.canvas_height.saturating_mul(scale),
        );
        tracing::debug!(scale, "Canvas scale changed");
        game.on_canvas_scale_change(scale)
    }

    /// Request the opposite fullscreen state unless a request is in flight
    pub fn toggle_fullscreen(&mut self, display: &mut impl Display) {
        if self.fullscreen_waiting {
            tracing::debug!("Fullscreen transition in progress; ignoring toggle");
            return;
        }
        if !self.is_fullscreen && !self.fullscreen_supported {
            tracing::debug!("Fullscreen unavailable; ignoring toggle");
            return;
        }
        self.fullscreen_waiting = true;
        display.request_fullscreen(!self.is_fullscreen);
    }

    /// Apply a display event
    pub fn handle_display_event(
        &mut self,
        game: &mut impl GameExports,
        event: DisplayEvent,
    ) -> Result<()> {
        match event {
            DisplayEvent::FullscreenChanged(is_fullscreen) => {
                self.is_fullscreen = is_fullscreen;
                game.on_fullscreen_change(is_fullscreen)?;
            }
            DisplayEvent::FullscreenRequestSettled(result) => {
                if let Err(e) = result {
                    tracing::error!("Fullscreen request failed: {}", e);
                }
                self.fullscreen_waiting = false;
            }
        }
        Ok(())
    }

    /// Forward an animation frame
    pub fn animation_frame(&mut self, game: &mut impl GameExports, timestamp_ms: f64) -> Result<()> {
        game.on_animation_frame(timestamp_ms)
    }
}
