//! The client's single cooperative loop.
//!
//! One task owns both pipelines: capture blocks are framed and sent as they
//! arrive, and inbound relay messages are fed to the playback scheduler.
//! Neither side ever blocks the other because sends use `try_send` and
//! scheduling never awaits.

use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::capture::{CaptureFramer, CaptureSource, OutboundAudio};
use super::playback::{PlaybackAction, PlaybackEngine, PlaybackScheduler};
use crate::core::realtime::{Frame, FrameLink, ParsedFrame, UpstreamEvent};

/// How long to keep listening after capture ends, by default.
pub const DEFAULT_LINGER: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to relay: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub url: String,
    /// Time to keep receiving once the capture source is exhausted
    pub linger: Duration,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            linger: DEFAULT_LINGER,
        }
    }
}

/// Counters collected over one client run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientReport {
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub chunks_scheduled: u64,
    pub interruptions: u64,
    pub events_received: u64,
}

/// Connect to the relay and run capture and playback until the relay closes,
/// or until `linger` has passed after the capture source ran dry.
///
/// Returns the report and the engine, so the caller can flush it.
pub async fn run_client<S, E>(
    options: &ClientOptions,
    mut source: S,
    engine: E,
) -> Result<(ClientReport, E), ClientError>
where
    S: CaptureSource,
    E: PlaybackEngine,
{
    let (socket, _response) = connect_async(options.url.as_str()).await?;
    info!(url = %options.url, "Connected to relay");

    let cancel = CancellationToken::new();
    let FrameLink {
        sender,
        mut receiver,
    } = FrameLink::spawn(socket, cancel.clone(), "relay");

    let mut outbound = OutboundAudio::new(sender);
    let mut framer = CaptureFramer::default();
    let mut scheduler = PlaybackScheduler::new(engine);
    let mut report = ClientReport::default();

    let mut capturing = true;
    let linger = tokio::time::sleep(Duration::MAX);
    tokio::pin!(linger);

    loop {
        tokio::select! {
            block = source.next_block(), if capturing => match block {
                Some(block) => {
                    for frame in framer.push(&block) {
                        outbound.send(&frame);
                    }
                }
                None => {
                    debug!(pending = framer.pending(), "Capture source exhausted");
                    capturing = false;
                    linger
                        .as_mut()
                        .reset(tokio::time::Instant::now() + options.linger);
                }
            },
            frame = receiver.recv() => match frame {
                Some(frame) => {
                    report.events_received += 1;
                    handle_frame(&frame, &mut scheduler, &mut report);
                }
                None => {
                    info!("Relay closed the connection");
                    break;
                }
            },
            _ = &mut linger => {
                debug!("Linger period elapsed");
                break;
            }
        }
    }

    outbound.detach();
    cancel.cancel();

    report.frames_sent = outbound.sent();
    report.frames_dropped = outbound.dropped();
    if report.frames_dropped > 0 {
        warn!(dropped = report.frames_dropped, "Capture frames were dropped");
    }
    info!(?report, "Client session finished");

    Ok((report, scheduler.into_engine()))
}

fn handle_frame<E: PlaybackEngine>(
    frame: &Frame,
    scheduler: &mut PlaybackScheduler<E>,
    report: &mut ClientReport,
) {
    let value = match ParsedFrame::classify(frame) {
        Some(ParsedFrame::Text(value)) => value,
        Some(ParsedFrame::Malformed(e)) => {
            warn!(error = %e, "Ignoring malformed relay message");
            return;
        }
        Some(ParsedFrame::Binary(_)) | None => return,
    };

    let event = match UpstreamEvent::from_value(&value) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Ignoring unrecognized relay event");
            return;
        }
    };

    match scheduler.handle_event(&event) {
        PlaybackAction::Scheduled(_) => report.chunks_scheduled += 1,
        PlaybackAction::Interrupted { .. } => report.interruptions += 1,
        PlaybackAction::Ignored => {}
    }
}
