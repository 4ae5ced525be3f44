use std::time::Duration;

use super::codec::{self, CodecError};

/// Sample rate shared by capture and playback (mono PCM16).
pub const SAMPLE_RATE: u32 = 24_000;

/// Which side of the pipeline produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDirection {
    /// Microphone samples heading upstream
    Capture,
    /// Assistant audio heading to the speaker
    Playback,
}

/// A block of mono 16-bit samples at [`SAMPLE_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Vec<i16>,
    direction: FrameDirection,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>, direction: FrameDirection) -> Self {
        Self { samples, direction }
    }

    /// Build a capture frame from normalized float samples.
    pub fn capture_from_float(samples: &[f32]) -> Self {
        Self::new(codec::float_to_pcm16(samples), FrameDirection::Capture)
    }

    /// Decode a base64 transport payload into a playback frame.
    pub fn playback_from_transport(encoded: &str) -> Result<Self, CodecError> {
        let bytes = codec::decode_transport(encoded)?;
        Ok(Self::new(
            codec::bytes_to_pcm16(&bytes),
            FrameDirection::Playback,
        ))
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn direction(&self) -> FrameDirection {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, derived from sample count and rate.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }

    /// Normalized float view used by playback engines.
    pub fn to_float(&self) -> Vec<f32> {
        codec::pcm16_to_float(&self.samples)
    }

    /// Base64 PCM16 payload used on the wire.
    pub fn to_transport(&self) -> String {
        codec::encode_transport(&codec::pcm16_to_bytes(&self.samples))
    }
}
