//! Gapless playback scheduling with barge-in.
//!
//! Audio deltas arrive in bursts much faster than they play. Each decoded
//! chunk is scheduled to start at `max(engine clock, cursor)` and the cursor
//! moves to the end of that chunk, so chunks play back-to-back with no gap
//! and no overlap. When the user starts speaking every unfinished chunk is
//! stopped and the cursor snaps back to the engine clock.

use tracing::{debug, info, warn};

use crate::core::audio::AudioFrame;
use crate::core::realtime::UpstreamEvent;

/// The audio output the scheduler drives.
pub trait PlaybackEngine {
    /// Playback clock in seconds. Never goes backwards.
    fn current_time(&self) -> f64;

    /// Play `frame` starting at `start` seconds on the engine clock.
    fn schedule(&mut self, id: u64, frame: &AudioFrame, start: f64);

    /// Silence a scheduled buffer from now on.
    fn stop(&mut self, id: u64);
}

/// A buffer handed to the engine and not yet known to be finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBuffer {
    pub id: u64,
    pub start: f64,
    pub end: f64,
}

/// What an upstream event did to the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackAction {
    Scheduled(ScheduledBuffer),
    Interrupted { stopped: usize },
    Ignored,
}

pub struct PlaybackScheduler<E: PlaybackEngine> {
    engine: E,
    next_start: f64,
    scheduled: Vec<ScheduledBuffer>,
    next_id: u64,
}

impl<E: PlaybackEngine> PlaybackScheduler<E> {
    pub fn new(engine: E) -> Self {
        let next_start = engine.current_time();
        Self {
            engine,
            next_start,
            scheduled: Vec::new(),
            next_id: 0,
        }
    }

    /// Start time the next chunk would get if the clock did not move.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    /// Buffers scheduled and not yet pruned.
    pub fn scheduled(&self) -> &[ScheduledBuffer] {
        &self.scheduled
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Queue `frame` right after everything already scheduled.
    ///
    /// Empty frames are not scheduled.
    pub fn schedule(&mut self, frame: &AudioFrame) -> Option<ScheduledBuffer> {
        if frame.is_empty() {
            return None;
        }

        let now = self.engine.current_time();
        self.prune(now);

        let start = now.max(self.next_start);
        let buffer = ScheduledBuffer {
            id: self.next_id,
            start,
            end: start + frame.duration_secs(),
        };
        self.next_id += 1;

        self.engine.schedule(buffer.id, frame, buffer.start);
        self.next_start = buffer.end;
        self.scheduled.push(buffer);
        Some(buffer)
    }

    /// Stop every unfinished buffer and reset the cursor to the engine clock.
    pub fn interrupt(&mut self) -> usize {
        let now = self.engine.current_time();
        let mut stopped = 0;
        for buffer in self.scheduled.drain(..) {
            if buffer.end > now {
                self.engine.stop(buffer.id);
                stopped += 1;
            }
        }
        self.next_start = now;
        stopped
    }

    /// React to one upstream event.
    pub fn handle_event(&mut self, event: &UpstreamEvent) -> PlaybackAction {
        match event {
            UpstreamEvent::AudioDelta { delta } => {
                match UpstreamEvent::decode_audio_delta(delta) {
                    Ok(frame) => match self.schedule(&frame) {
                        Some(buffer) => PlaybackAction::Scheduled(buffer),
                        None => PlaybackAction::Ignored,
                    },
                    Err(e) => {
                        warn!(error = %e, "Dropping undecodable audio delta");
                        PlaybackAction::Ignored
                    }
                }
            }
            UpstreamEvent::SpeechStarted { .. } => {
                let stopped = self.interrupt();
                debug!(stopped, "Barge-in: playback interrupted");
                PlaybackAction::Interrupted { stopped }
            }
            UpstreamEvent::AudioDone => {
                info!(until = self.next_start, "Assistant audio complete");
                PlaybackAction::Ignored
            }
            UpstreamEvent::Error { error } => {
                warn!(message = %error.message, "Realtime session reported an error");
                PlaybackAction::Ignored
            }
            _ => PlaybackAction::Ignored,
        }
    }

    fn prune(&mut self, now: f64) {
        self.scheduled.retain(|b| b.end > now);
    }
}
