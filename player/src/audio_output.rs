//! Audio output using cpal and ring buffer

use anyhow::{Context, Result, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use oxid_host_core::{AudioPlatform, AudioSession};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use tracing::{debug, error, info};

/// Module buffers the ring can hold before the pump has to wait
const BUFFERED_CALLBACKS: usize = 4;

/// cpal-backed [`AudioPlatform`]
///
/// Opens the default output device on enable and drops the stream on
/// disable. The module produces mono samples; they are copied to every
/// device channel.
pub struct CpalAudio {
    master_volume: f32,
}

impl CpalAudio {
    pub fn new(master_volume: f32) -> Self {
        Self { master_volume }
    }

    /// Whether the default host has an output device
    pub fn available() -> bool {
        cpal::default_host().default_output_device().is_some()
    }
}

/// An open cpal stream and the producer side of its ring buffer
pub struct CpalSession {
    producer: HeapProd<f32>,
    /// The cpal stream (kept alive for the duration)
    stream: cpal::Stream,
    sample_rate: u32,
    channels: usize,
    master_volume: f32,
}

impl AudioPlatform for CpalAudio {
    type Session = CpalSession;

    fn open(&mut self, buffer_size: u32) -> Result<CpalSession> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No audio output device available")?;
        let supported = device
            .default_output_config()
            .context("Failed to get default output config")?;

        let sample_rate = supported.sample_rate().0;
        let channels = usize::from(supported.channels());
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let capacity = (buffer_size as usize)
            .max(1)
            .saturating_mul(channels)
            .saturating_mul(BUFFERED_CALLBACKS);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();

        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, consumer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, consumer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, consumer)?,
            other => bail!("Unsupported sample format: {other:?}"),
        };
        stream.play().context("Failed to play audio stream")?;

        info!(sample_rate, channels, buffer_size, "Audio stream started");
        Ok(CpalSession {
            producer,
            stream,
            sample_rate,
            channels,
            master_volume: self.master_volume,
        })
    }

    fn close(&mut self, session: CpalSession) -> Result<()> {
        session
            .stream
            .pause()
            .context("Failed to pause audio stream")?;
        debug!("Audio stream stopped");
        Ok(())
    }
}

impl AudioSession for CpalSession {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn wants_samples(&self, sample_count: usize) -> bool {
        self.producer.vacant_len() >= sample_count.saturating_mul(self.channels)
    }

    fn write(&mut self, samples: &[f32]) {
        let frames = interleave(samples, self.channels, self.master_volume);
        let pushed = self.producer.push_slice(&frames);
        if pushed < frames.len() {
            debug!(
                "Audio buffer overflow: dropped {} samples",
                frames.len() - pushed
            );
        }
    }
}

/// Copy each mono sample to every channel, scaled by `volume`
fn interleave(samples: &[f32], channels: usize, volume: f32) -> Vec<f32> {
    samples
        .iter()
        .flat_map(|&s| std::iter::repeat_n(s * volume, channels))
        .collect()
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: HeapCons<f32>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let mut temp_buffer: Vec<f32> = vec![0.0; 4096];
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if temp_buffer.len() < data.len() {
                    temp_buffer.resize(data.len(), 0.0);
                }
                // Batch pop; per-sample pops leave timing gaps
                let popped = consumer.pop_slice(&mut temp_buffer[..data.len()]);
                for (out, &f) in data.iter_mut().zip(&temp_buffer[..popped]) {
                    *out = T::from_sample(f);
                }
                data[popped..].fill(T::EQUILIBRIUM);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .context("Failed to build audio stream")
}
