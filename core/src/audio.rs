//! Audio bridge
//!
//! Sound is off until the module asks for it. Enabling opens one output
//! session sized by `getAudioBufferSize()`; while it is open the host pulls
//! mono samples from `audioCallback(sampleRate)` whenever the session has room
//! for another buffer. Enable and disable each finish on the next
//! [`AudioBridge::drive`], and toggles arriving in between are dropped.

use anyhow::Result;

use crate::wasm::GameExports;

/// An open output stream
pub trait AudioSession {
    /// Device sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Whether the stream has room for `sample_count` more samples
    fn wants_samples(&self, sample_count: usize) -> bool;

    /// Queue mono samples for playback
    fn write(&mut self, samples: &[f32]);
}

/// Platform audio port
pub trait AudioPlatform {
    type Session: AudioSession;

    /// Open an output session that plays `buffer_size`-sample mono buffers
    fn open(&mut self, buffer_size: u32) -> Result<Self::Session>;

    /// Tear a session down
    fn close(&mut self, session: Self::Session) -> Result<()>;
}

/// Where the bridge is in its enable/disable cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Disabled,
    Enabling { buffer_size: u32 },
    Enabled,
    Disabling,
}

/// Default cap on module callbacks per pump
const MAX_CALLBACKS_PER_PUMP: usize = 8;

/// Latched sound on/off state machine and sample pump
pub struct AudioBridge<P: AudioPlatform> {
    platform: P,
    available: bool,
    state: AudioState,
    session: Option<P::Session>,
    buffer_size: u32,
    max_callbacks_per_pump: usize,
}

impl<P: AudioPlatform> AudioBridge<P> {
    /// `available` comes from the platform capabilities resolved at startup
    pub fn new(platform: P, available: bool) -> Self {
        Self {
            platform,
            available,
            state: AudioState::Disabled,
            session: None,
            buffer_size: 0,
            max_callbacks_per_pump: MAX_CALLBACKS_PER_PUMP,
        }
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == AudioState::Enabled
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Request the opposite of the current sound state
    ///
    /// Ignored while a transition is in flight. Enabling without audio
    /// support logs and stays disabled.
    pub fn request_toggle(&mut self, game: &mut impl GameExports) -> Result<()> {
        match self.state {
            AudioState::Enabling { .. } | AudioState::Disabling => {
                tracing::debug!(state = ?self.state, "Audio transition in progress; ignoring toggle");
            }
            AudioState::Disabled => {
                if !self.available {
                    tracing::warn!("Audio output unavailable; sound stays off");
                    return Ok(());
                }
                let Some(buffer_size) = game.audio_buffer_size()? else {
                    tracing::warn!("Module does not export getAudioBufferSize; sound stays off");
                    return Ok(());
                };
                if buffer_size == 0 {
                    tracing::warn!("Module requested a zero-sample audio buffer; sound stays off");
                    return Ok(());
                }
                self.state = AudioState::Enabling { buffer_size };
            }
            AudioState::Enabled => {
                self.state = AudioState::Disabling;
            }
        }
        Ok(())
    }

    /// Complete a pending transition and notify the module
    pub fn drive(&mut self, game: &mut impl GameExports) -> Result<()> {
        match self.state {
            AudioState::Enabling { buffer_size } => match self.platform.open(buffer_size) {
                Ok(session) => {
                    tracing::info!(
                        buffer_size,
                        sample_rate = session.sample_rate(),
                        "Sound enabled"
                    );
                    self.session = Some(session);
                    self.buffer_size = buffer_size;
                    self.state = AudioState::Enabled;
                    game.on_sound_enabled_change(true)?;
                }
                Err(e) => {
                    tracing::error!("Failed to open audio output: {:#}", e);
                    self.state = AudioState::Disabled;
                }
            },
            AudioState::Disabling => {
                if let Some(session) = self.session.take()
                    && let Err(e) = self.platform.close(session)
                {
                    tracing::error!("Failed to close audio output: {:#}", e);
                }
                tracing::info!("Sound disabled");
                self.state = AudioState::Disabled;
                game.on_sound_enabled_change(false)?;
            }
            AudioState::Disabled | AudioState::Enabled => {}
        }
        Ok(())
    }

    /// Pull sample buffers from the module while the session has room
    ///
    /// Returns the number of buffers written.
    pub fn pump(&mut self, game: &mut impl GameExports) -> Result<usize> {
        if self.state != AudioState::Enabled {
            return Ok(0);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };
        let mut written = 0;
        while written < self.max_callbacks_per_pump
            && session.wants_samples(self.buffer_size as usize)
        {
            let samples = game.audio_callback(session.sample_rate(), self.buffer_size)?;
            session.write(&samples);
            written += 1;
        }
        Ok(written)
    }
}

/// Platform with no audio output; opening always fails
#[derive(Debug, Default)]
pub struct NullAudioPlatform;

/// Never constructed
#[derive(Debug)]
pub struct NullSession;

impl AudioSession for NullSession {
    fn sample_rate(&self) -> u32 {
        0
    }

    fn wants_samples(&self, _sample_count: usize) -> bool {
        false
    }

    fn write(&mut self, _samples: &[f32]) {}
}

impl AudioPlatform for NullAudioPlatform {
    type Session = NullSession;

    fn open(&mut self, _buffer_size: u32) -> Result<NullSession> {
        anyhow::bail!("no audio output device")
    }

    fn close(&mut self, _session: NullSession) -> Result<()> {
        Ok(())
    }
}
