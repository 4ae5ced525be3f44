//! WAV file endpoints for the headless client.
//!
//! [`WavCaptureSource`] replays a recording as if it were a microphone,
//! releasing blocks at real-time pace. [`WavRenderEngine`] is a playback
//! engine that renders scheduled audio onto a timeline driven by the tokio
//! clock and writes it out as a WAV file when the session ends.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::capture::CaptureSource;
use super::playback::PlaybackEngine;
use crate::core::audio::{AudioFrame, SAMPLE_RATE};

/// Samples released per tick (100 ms).
pub const CAPTURE_BLOCK_SAMPLES: usize = 2400;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("WAV error: {0}")]
    Hound(#[from] hound::Error),

    #[error("Unsupported sample rate {0} Hz, expected {SAMPLE_RATE} Hz")]
    SampleRate(u32),
}

/// Read a WAV file as normalized mono samples at [`SAMPLE_RATE`].
///
/// Multi-channel input is averaged down to mono. Resampling is not done.
pub fn read_mono_samples(path: impl AsRef<Path>) -> Result<Vec<f32>, WavError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_rate != SAMPLE_RATE {
        return Err(WavError::SampleRate(spec.sample_rate));
    }
    let channels = spec.channels.max(1) as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample.max(2) as u32;
            let max_val = ((1i64 << (bits - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s as f32 / max_val).clamp(-1.0, 1.0)))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    if channels == 1 {
        return Ok(samples);
    }
    Ok(samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect())
}

/// A capture source that plays back a WAV file at real-time pace.
pub struct WavCaptureSource {
    samples: Vec<f32>,
    position: usize,
    block: usize,
    ticker: Interval,
}

impl WavCaptureSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WavError> {
        Ok(Self::from_samples(read_mono_samples(path)?))
    }

    /// Must be called inside a tokio runtime.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        let period = Duration::from_micros(
            CAPTURE_BLOCK_SAMPLES as u64 * 1_000_000 / SAMPLE_RATE as u64,
        );
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            samples,
            position: 0,
            block: CAPTURE_BLOCK_SAMPLES,
            ticker,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

#[async_trait]
impl CaptureSource for WavCaptureSource {
    async fn next_block(&mut self) -> Option<Vec<f32>> {
        if self.position >= self.samples.len() {
            return None;
        }
        self.ticker.tick().await;

        let end = (self.position + self.block).min(self.samples.len());
        let block = self.samples[self.position..end].to_vec();
        self.position = end;
        Some(block)
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    offset: usize,
    len: usize,
}

/// A playback engine that renders onto an in-memory timeline.
pub struct WavRenderEngine {
    origin: Instant,
    timeline: Vec<i16>,
    placements: HashMap<u64, Placement>,
}

impl Default for WavRenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WavRenderEngine {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timeline: Vec::new(),
            placements: HashMap::new(),
        }
    }

    /// Rendered samples so far.
    pub fn timeline(&self) -> &[i16] {
        &self.timeline
    }

    fn sample_index(seconds: f64) -> usize {
        (seconds.max(0.0) * SAMPLE_RATE as f64).round() as usize
    }

    /// Write the rendered timeline to `path` as 16-bit mono.
    pub fn finish(self, path: impl AsRef<Path>) -> Result<Duration, WavError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.timeline {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        let duration = Duration::from_secs_f64(self.timeline.len() as f64 / SAMPLE_RATE as f64);
        info!(seconds = duration.as_secs_f64(), "Playback rendered");
        Ok(duration)
    }
}

impl PlaybackEngine for WavRenderEngine {
    fn current_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn schedule(&mut self, id: u64, frame: &AudioFrame, start: f64) {
        let now = Self::sample_index(self.current_time());
        self.placements.retain(|_, p| p.offset + p.len > now);

        let offset = Self::sample_index(start);
        let end = offset + frame.len();
        if self.timeline.len() < end {
            self.timeline.resize(end, 0);
        }
        self.timeline[offset..end].copy_from_slice(frame.samples());
        self.placements.insert(
            id,
            Placement {
                offset,
                len: frame.len(),
            },
        );
    }

    fn stop(&mut self, id: u64) {
        let Some(placement) = self.placements.remove(&id) else {
            return;
        };
        let now = Self::sample_index(self.current_time());
        let end = (placement.offset + placement.len).min(self.timeline.len());
        let from = placement.offset.max(now).min(end);
        self.timeline[from..end].fill(0);

        // Drop the silent tail nothing else is still playing into
        let keep = self
            .placements
            .values()
            .map(|p| p.offset + p.len)
            .max()
            .unwrap_or(0)
            .max(now)
            .min(self.timeline.len());
        self.timeline.truncate(keep);
        debug!(id, silenced = end - from, "Stopped playback buffer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::FrameDirection;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_downmixes_stereo() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[32767, 0, -32767, -32767]);

        let samples = read_mono_samples(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.5).abs() < 1e-4);
        assert!((samples[1] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_read_rejects_other_sample_rates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cd.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        hound::WavWriter::create(&path, spec)
            .unwrap()
            .finalize()
            .unwrap();

        assert!(matches!(
            read_mono_samples(&path),
            Err(WavError::SampleRate(44_100))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_source_paces_blocks() {
        let mut source = WavCaptureSource::from_samples(vec![0.0; CAPTURE_BLOCK_SAMPLES * 2 + 10]);
        let started = Instant::now();

        let mut sizes = Vec::new();
        while let Some(block) = source.next_block().await {
            sizes.push(block.len());
        }

        assert_eq!(sizes, vec![CAPTURE_BLOCK_SAMPLES, CAPTURE_BLOCK_SAMPLES, 10]);
        // First tick is immediate, the next two wait 100 ms each
        assert_eq!(started.elapsed().as_millis(), 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_engine_places_and_silences() {
        let mut engine = WavRenderEngine::new();
        let frame = AudioFrame::new(vec![1000; 2400], FrameDirection::Playback);

        engine.schedule(0, &frame, 0.0);
        engine.schedule(1, &frame, 0.1);
        assert_eq!(engine.timeline().len(), 4800);

        tokio::time::advance(Duration::from_millis(150)).await;
        engine.stop(1);

        assert_eq!(engine.timeline().len(), 3600);
        assert!(engine.timeline().iter().all(|&s| s == 1000));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let duration = engine.finish(&path).unwrap();
        assert_eq!(duration.as_millis(), 150);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 3600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_engine_forgets_finished_buffers() {
        let mut engine = WavRenderEngine::new();
        let frame = AudioFrame::new(vec![500; 2400], FrameDirection::Playback);

        for id in 0..10u64 {
            let start = engine.current_time();
            engine.schedule(id, &frame, start);
            tokio::time::advance(Duration::from_millis(200)).await;
        }
        let start = engine.current_time();
        engine.schedule(10, &frame, start);

        // Only the buffer still playing is tracked
        assert_eq!(engine.placements.len(), 1);
        assert!(engine.placements.contains_key(&10));

        // Stopping a finished buffer leaves the rendered audio alone
        let rendered = engine.timeline().to_vec();
        engine.stop(3);
        assert_eq!(engine.timeline(), rendered.as_slice());
    }
}
