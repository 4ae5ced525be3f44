//! Microphone-side half of the client pipeline.
//!
//! Capture sources deliver normalized float blocks of whatever size they
//! like. [`CaptureFramer`] regroups them into fixed frames, and
//! [`OutboundAudio`] turns each frame into an `input_audio_buffer.append`
//! event on the relay link. Frames produced while the link is not open are
//! dropped, never buffered.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::core::audio::AudioFrame;
use crate::core::realtime::{ClientEvent, Frame, FrameRoute};

/// Samples per outbound capture frame.
pub const CAPTURE_FRAME_SAMPLES: usize = 4096;

/// A stream of normalized float samples at 24 kHz mono.
#[async_trait]
pub trait CaptureSource: Send {
    /// Next block of samples, or `None` once the source is exhausted.
    async fn next_block(&mut self) -> Option<Vec<f32>>;
}

/// Regroups arbitrary blocks into fixed-size capture frames.
#[derive(Debug)]
pub struct CaptureFramer {
    frame_size: usize,
    pending: Vec<f32>,
}

impl Default for CaptureFramer {
    fn default() -> Self {
        Self::new(CAPTURE_FRAME_SAMPLES)
    }
}

impl CaptureFramer {
    pub fn new(frame_size: usize) -> Self {
        let frame_size = frame_size.max(1);
        Self {
            frame_size,
            pending: Vec::with_capacity(frame_size),
        }
    }

    /// Samples held back waiting for a full frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append `block` and return every frame it completed.
    pub fn push(&mut self, block: &[f32]) -> Vec<AudioFrame> {
        self.pending.extend_from_slice(block);

        let complete = self.pending.len() / self.frame_size;
        if complete == 0 {
            return Vec::new();
        }

        let split = complete * self.frame_size;
        let frames = self.pending[..split]
            .chunks_exact(self.frame_size)
            .map(AudioFrame::capture_from_float)
            .collect();
        self.pending.drain(..split);
        frames
    }
}

/// Sends capture frames to the relay, dropping them when the link is down.
#[derive(Debug, Default)]
pub struct OutboundAudio {
    sender: Option<mpsc::Sender<FrameRoute>>,
    sent: u64,
    dropped: u64,
}

impl OutboundAudio {
    /// A sender with no link attached yet.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn new(sender: mpsc::Sender<FrameRoute>) -> Self {
        Self {
            sender: Some(sender),
            ..Self::default()
        }
    }

    pub fn attach(&mut self, sender: mpsc::Sender<FrameRoute>) {
        self.sender = Some(sender);
    }

    /// Drop the link; the writer closes once no other sender holds it.
    pub fn detach(&mut self) {
        self.sender = None;
    }

    pub fn is_open(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| !s.is_closed())
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Queue one frame. Returns `false` when it was dropped.
    pub fn send(&mut self, frame: &AudioFrame) -> bool {
        let Some(sender) = self.sender.as_ref() else {
            self.dropped += 1;
            return false;
        };

        let text = match ClientEvent::audio_append(frame).to_json() {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Failed to serialize capture frame");
                self.dropped += 1;
                return false;
            }
        };

        match sender.try_send(Frame::Text(text).into()) {
            Ok(()) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                trace!(error = %e, "Capture frame dropped");
                self.dropped += 1;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::realtime::FRAME_CHANNEL_CAPACITY;
    use serde_json::Value;

    #[test]
    fn test_framer_emits_fixed_frames() {
        let mut framer = CaptureFramer::default();

        assert!(framer.push(&[0.1; 1000]).is_empty());
        assert_eq!(framer.pending(), 1000);

        let frames = framer.push(&[0.1; 8000]);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.len() == CAPTURE_FRAME_SAMPLES));
        assert_eq!(framer.pending(), 9000 - 2 * CAPTURE_FRAME_SAMPLES);
    }

    #[test]
    fn test_framer_preserves_sample_order() {
        let mut framer = CaptureFramer::new(4);
        let frames = framer.push(&[0.0, 0.5, -0.5, 1.0, 0.25]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].samples(), &[0, 16383, -16384, 32767]);

        let frames = framer.push(&[0.0, 0.0, 0.0]);
        assert_eq!(frames[0].samples()[0], 8191);
    }

    #[tokio::test]
    async fn test_outbound_encodes_append_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut outbound = OutboundAudio::new(tx);
        let frame = AudioFrame::capture_from_float(&[0.5; 16]);

        assert!(outbound.send(&frame));
        assert_eq!(outbound.sent(), 1);

        let Some(FrameRoute::Frame(Frame::Text(text))) = rx.recv().await else {
            panic!("expected a text frame");
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "input_audio_buffer.append");
        assert_eq!(value["audio"], frame.to_transport());
    }

    #[test]
    fn test_outbound_drops_when_not_open() {
        let mut outbound = OutboundAudio::detached();
        let frame = AudioFrame::capture_from_float(&[0.0; 8]);
        assert!(!outbound.is_open());
        assert!(!outbound.send(&frame));

        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        outbound.attach(tx);
        assert!(outbound.is_open());
        drop(rx);
        assert!(!outbound.is_open());
        assert!(!outbound.send(&frame));

        assert_eq!(outbound.sent(), 0);
        assert_eq!(outbound.dropped(), 2);
    }
}
