//! PCM16 sample conversion and transport encoding.
//!
//! All functions here are pure and stateless:
//! - `f32` samples in `[-1.0, 1.0]` <-> signed 16-bit integers
//! - `i16` samples <-> little-endian byte buffers
//! - raw bytes <-> base64 text suitable for JSON string fields

use base64::prelude::*;
use thiserror::Error;

/// Scale applied to negative samples when encoding.
const NEGATIVE_SCALE: f32 = 32768.0;

/// Scale applied to non-negative samples when encoding, and to all samples when decoding.
const POSITIVE_SCALE: f32 = 32767.0;

/// Errors produced by the transport decode path.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload is not valid base64
    #[error("Invalid base64 audio payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Convert normalized float samples to signed 16-bit samples.
///
/// Values outside `[-1.0, 1.0]` are clipped before scaling. Negative values are
/// scaled by 32768 and non-negative values by 32767 so both ends of the range
/// map exactly onto `i16::MIN` and `i16::MAX`.
pub fn float_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples.iter().map(|&s| float_sample_to_pcm16(s)).collect()
}

#[inline]
fn float_sample_to_pcm16(sample: f32) -> i16 {
    // NaN would otherwise survive clamp and cast to 0 silently; make that explicit
    let s = if sample.is_nan() {
        0.0
    } else {
        sample.clamp(-1.0, 1.0)
    };
    if s < 0.0 {
        (s * NEGATIVE_SCALE) as i16
    } else {
        (s * POSITIVE_SCALE) as i16
    }
}

/// Convert signed 16-bit samples to normalized floats by dividing by 32767.
///
/// `i16::MIN` maps slightly below -1.0; playback engines accept that.
pub fn pcm16_to_float(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / POSITIVE_SCALE).collect()
}

/// Serialize samples as little-endian bytes.
pub fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Reinterpret little-endian bytes as 16-bit samples.
///
/// A trailing odd byte is dropped; it cannot form a complete sample.
pub fn bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode raw bytes for embedding in a JSON string field.
pub fn encode_transport(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode a transport string back into raw bytes.
pub fn decode_transport(encoded: &str) -> Result<Vec<u8>, CodecError> {
    Ok(BASE64_STANDARD.decode(encoded)?)
}

/// Capture path in one step: float samples to a base64 PCM16 payload.
pub fn encode_float_frame(samples: &[f32]) -> String {
    encode_transport(&pcm16_to_bytes(&float_to_pcm16(samples)))
}

/// Playback path in one step: base64 PCM16 payload to float samples.
pub fn decode_float_frame(encoded: &str) -> Result<Vec<f32>, CodecError> {
    let bytes = decode_transport(encoded)?;
    Ok(pcm16_to_float(&bytes_to_pcm16(&bytes)))
}
