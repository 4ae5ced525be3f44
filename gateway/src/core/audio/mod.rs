//! Audio codec for the realtime pipeline.
//!
//! # Audio Format
//!
//! Both directions use mono PCM 16-bit signed little-endian at 24kHz,
//! carried inside JSON messages as base64 strings.

pub mod codec;
mod frame;

pub use codec::{
    CodecError, bytes_to_pcm16, decode_float_frame, decode_transport, encode_float_frame,
    encode_transport, float_to_pcm16, pcm16_to_bytes, pcm16_to_float,
};
pub use frame::{AudioFrame, FrameDirection, SAMPLE_RATE};
