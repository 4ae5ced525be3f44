//! Headless voice client.
//!
//! Streams a capture source to the relay and plays the assistant's audio
//! back through a [`PlaybackEngine`] with gapless scheduling and barge-in.

pub mod capture;
pub mod playback;
pub mod session;
pub mod wav;

pub use capture::{CAPTURE_FRAME_SAMPLES, CaptureFramer, CaptureSource, OutboundAudio};
pub use playback::{PlaybackAction, PlaybackEngine, PlaybackScheduler, ScheduledBuffer};
pub use session::{ClientError, ClientOptions, ClientReport, DEFAULT_LINGER, run_client};
pub use wav::{WavCaptureSource, WavError, WavRenderEngine, read_mono_samples};
