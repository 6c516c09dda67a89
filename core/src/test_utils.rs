//! Shared test utilities for integration and unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::audio::{AudioPlatform, AudioSession};
use crate::wasm::GameExports;

// ============================================================================
// Test Game
// ============================================================================

/// A call the host made into [`FakeGame`]
#[derive(Debug, Clone, PartialEq)]
pub enum GameCall {
    KeyEvent(u32, bool),
    AnimationFrame(f64),
    FullscreenChange(bool),
    CanvasScaleChange(u32),
    SoundEnabledChange(bool),
    AudioBufferSize,
    AudioCallback(u32),
}

/// Scripted stand-in for a module's exports
#[derive(Debug)]
pub struct FakeGame {
    pub calls: Vec<GameCall>,
    /// Results returned by successive key events; 0 once exhausted
    pub key_results: VecDeque<i32>,
    /// Behave like a module with only `onKeyDown`/`onKeyUp`
    pub legacy_keys: bool,
    pub audio_buffer_size: Option<u32>,
    /// Value every sample is filled with
    pub sample_value: f32,
}

impl Default for FakeGame {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            key_results: VecDeque::new(),
            legacy_keys: false,
            audio_buffer_size: Some(512),
            sample_value: 0.25,
        }
    }
}

impl FakeGame {
    pub fn with_key_results(results: Vec<i32>) -> Self {
        Self {
            key_results: results.into(),
            ..Default::default()
        }
    }

    pub fn legacy() -> Self {
        Self {
            legacy_keys: true,
            ..Default::default()
        }
    }
}

impl GameExports for FakeGame {
    fn on_key_event(&mut self, code: u32, pressed: bool) -> Result<Option<i32>> {
        self.calls.push(GameCall::KeyEvent(code, pressed));
        if self.legacy_keys {
            return Ok(None);
        }
        Ok(Some(self.key_results.pop_front().unwrap_or(0)))
    }

    fn on_animation_frame(&mut self, timestamp_ms: f64) -> Result<()> {
        self.calls.push(GameCall::AnimationFrame(timestamp_ms));
        Ok(())
    }

    fn on_fullscreen_change(&mut self, is_fullscreen: bool) -> Result<()> {
        self.calls.push(GameCall::FullscreenChange(is_fullscreen));
        Ok(())
    }

    fn on_canvas_scale_change(&mut self, scale: u32) -> Result<()> {
        self.calls.push(GameCall::CanvasScaleChange(scale));
        Ok(())
    }

    fn on_sound_enabled_change(&mut self, enabled: bool) -> Result<()> {
        self.calls.push(GameCall::SoundEnabledChange(enabled));
        Ok(())
    }

    fn audio_buffer_size(&mut self) -> Result<Option<u32>> {
        self.calls.push(GameCall::AudioBufferSize);
        Ok(self.audio_buffer_size)
    }

    fn audio_callback(&mut self, sample_rate: u32, sample_count: u32) -> Result<Vec<f32>> {
        self.calls.push(GameCall::AudioCallback(sample_rate));
        Ok(vec![self.sample_value; sample_count as usize])
    }
}

// ============================================================================
// Test Audio Platform
// ============================================================================

#[derive(Debug)]
struct FakeAudioShared {
    opened: u32,
    closed: u32,
    fail_close: bool,
    capacity: usize,
    queued: Vec<f32>,
}

/// Audio platform that records sessions and buffers samples in memory
#[derive(Debug, Clone)]
pub struct FakeAudioPlatform {
    sample_rate: u32,
    shared: Rc<RefCell<FakeAudioShared>>,
}

impl FakeAudioPlatform {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            shared: Rc::new(RefCell::new(FakeAudioShared {
                opened: 0,
                closed: 0,
                fail_close: false,
                capacity: 4096,
                queued: Vec::new(),
            })),
        }
    }

    pub fn opened(&self) -> u32 {
        self.shared.borrow().opened
    }

    pub fn closed(&self) -> u32 {
        self.shared.borrow().closed
    }

    /// Samples written so far
    pub fn queued(&self) -> usize {
        self.shared.borrow().queued.len()
    }

    pub fn samples(&self) -> Vec<f32> {
        self.shared.borrow().queued.clone()
    }

    /// Total samples sessions accept before reporting full
    pub fn set_capacity(&self, capacity: usize) {
        self.shared.borrow_mut().capacity = capacity;
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.shared.borrow_mut().fail_close = fail;
    }
}

/// Session handed out by [`FakeAudioPlatform`]
#[derive(Debug)]
pub struct FakeAudioSession {
    sample_rate: u32,
    shared: Rc<RefCell<FakeAudioShared>>,
}

impl AudioSession for FakeAudioSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn wants_samples(&self, sample_count: usize) -> bool {
        let shared = self.shared.borrow();
        shared.queued.len().saturating_add(sample_count) <= shared.capacity
    }

    fn write(&mut self, samples: &[f32]) {
        self.shared.borrow_mut().queued.extend_from_slice(samples);
    }
}

impl AudioPlatform for FakeAudioPlatform {
    type Session = FakeAudioSession;

    fn open(&mut self, _buffer_size: u32) -> Result<FakeAudioSession> {
        self.shared.borrow_mut().opened += 1;
        Ok(FakeAudioSession {
            sample_rate: self.sample_rate,
            shared: Rc::clone(&self.shared),
        })
    }

    fn close(&mut self, _session: FakeAudioSession) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        shared.closed += 1;
        if shared.fail_close {
            bail!("device already closed");
        }
        Ok(())
    }
}
