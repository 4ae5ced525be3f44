//! Socket pumps and frame classification.
//!
//! Every WebSocket the relay touches is split into a reader pump and a writer
//! pump. The pumps translate between the socket's own message type and
//! [`Frame`], and talk to the rest of the relay through bounded channels.
//! The writer is the only task that ever writes to its socket, so writes are
//! serialized without a lock.
//!
//! Closing works by dropping: when every [`FrameRoute`] sender is gone the
//! writer sends a Close frame and exits; when the socket ends the reader
//! drops its [`Frame`] sender and the consumer sees the channel close.

use std::fmt::Display;

use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Bounded capacity of every pump channel.
pub const FRAME_CHANNEL_CAPACITY: usize = 256;

/// A data frame, independent of the socket implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
    Close,
}

/// Unit of work for a writer pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRoute {
    /// A single frame
    Frame(Frame),
    /// Frames written back-to-back with nothing interleaved
    Sequence(Vec<Frame>),
}

impl From<Frame> for FrameRoute {
    fn from(frame: Frame) -> Self {
        FrameRoute::Frame(frame)
    }
}

impl FrameRoute {
    /// Flatten into the frames it will write, in order.
    pub fn into_frames(self) -> Vec<Frame> {
        match self {
            FrameRoute::Frame(frame) => vec![frame],
            FrameRoute::Sequence(frames) => frames,
        }
    }
}

/// Explicit classification of an inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFrame {
    /// A JSON document
    Text(Value),
    /// A binary payload that is not JSON
    Binary(Bytes),
    /// A text frame that failed to parse
    Malformed(String),
}

impl ParsedFrame {
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => ParsedFrame::Text(value),
            Err(e) => ParsedFrame::Malformed(e.to_string()),
        }
    }

    /// Binary frames that happen to hold JSON are treated as text.
    pub fn from_binary(data: Bytes) -> Self {
        match serde_json::from_slice(&data) {
            Ok(value) => ParsedFrame::Text(value),
            Err(_) => ParsedFrame::Binary(data),
        }
    }

    /// `None` for Close frames, which carry no payload.
    pub fn classify(frame: &Frame) -> Option<Self> {
        match frame {
            Frame::Text(text) => Some(Self::from_text(text)),
            Frame::Binary(data) => Some(Self::from_binary(data.clone())),
            Frame::Close => None,
        }
    }
}

/// Conversion between a socket library's message type and [`Frame`].
pub trait WireMessage: Sized + Send + 'static {
    /// `None` for control frames the relay does not see (ping/pong).
    fn into_frame(self) -> Option<Frame>;

    fn from_frame(frame: Frame) -> Self;
}

impl WireMessage for axum::extract::ws::Message {
    fn into_frame(self) -> Option<Frame> {
        use axum::extract::ws::Message;
        match self {
            Message::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
            Message::Binary(data) => Some(Frame::Binary(data)),
            Message::Close(_) => Some(Frame::Close),
            Message::Ping(_) | Message::Pong(_) => None,
        }
    }

    fn from_frame(frame: Frame) -> Self {
        use axum::extract::ws::Message;
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Close => Message::Close(None),
        }
    }
}

impl WireMessage for tokio_tungstenite::tungstenite::Message {
    fn into_frame(self) -> Option<Frame> {
        use tokio_tungstenite::tungstenite::Message;
        match self {
            Message::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
            Message::Binary(data) => Some(Frame::Binary(data)),
            Message::Close(_) => Some(Frame::Close),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
        }
    }

    fn from_frame(frame: Frame) -> Self {
        use tokio_tungstenite::tungstenite::Message;
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Close => Message::Close(None),
        }
    }
}

/// One side of a pumped connection, as seen by the relay.
#[derive(Debug)]
pub struct FrameLink {
    pub sender: mpsc::Sender<FrameRoute>,
    pub receiver: mpsc::Receiver<Frame>,
}

/// The far end of an in-memory [`FrameLink`].
#[derive(Debug)]
pub struct FrameLinkPeer {
    /// Everything written to the link
    pub outgoing: mpsc::Receiver<FrameRoute>,
    /// Inject frames the link will read
    pub incoming: mpsc::Sender<Frame>,
}

impl FrameLink {
    /// Split `socket` and spawn its reader and writer pumps.
    ///
    /// The reader stops at Close, at end of stream, on a read error, or when
    /// `cancel` fires. The writer stops when every sender is dropped, and
    /// cancels `cancel` if the socket rejects a write.
    pub fn spawn<S, M, E>(socket: S, cancel: CancellationToken, label: &'static str) -> Self
    where
        S: Stream<Item = Result<M, E>> + Sink<M> + Send + 'static,
        <S as Sink<M>>::Error: Display,
        M: WireMessage,
        E: Display + Send + 'static,
    {
        let (sink, stream) = socket.split();
        let (route_tx, route_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

        tokio::spawn(read_pump(stream, frame_tx, cancel.clone(), label));
        tokio::spawn(write_pump(sink, route_rx, cancel, label));

        Self {
            sender: route_tx,
            receiver: frame_rx,
        }
    }

    /// An in-memory link and the peer that drives it.
    pub fn in_memory() -> (Self, FrameLinkPeer) {
        let (route_tx, route_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        (
            Self {
                sender: route_tx,
                receiver: frame_rx,
            },
            FrameLinkPeer {
                outgoing: route_rx,
                incoming: frame_tx,
            },
        )
    }
}

async fn read_pump<St, M, E>(
    mut stream: St,
    frames: mpsc::Sender<Frame>,
    cancel: CancellationToken,
    label: &'static str,
) where
    St: Stream<Item = Result<M, E>> + Unpin,
    M: WireMessage,
    E: Display,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.next() => next,
        };

        match next {
            Some(Ok(message)) => match message.into_frame() {
                Some(Frame::Close) => {
                    debug!(side = label, "Close frame received");
                    break;
                }
                Some(frame) => {
                    if frames.send(frame).await.is_err() {
                        break;
                    }
                }
                None => {}
            },
            Some(Err(e)) => {
                warn!(side = label, error = %e, "WebSocket read failed");
                break;
            }
            None => {
                debug!(side = label, "WebSocket stream ended");
                break;
            }
        }
    }
}

async fn write_pump<Si, M>(
    mut sink: Si,
    mut routes: mpsc::Receiver<FrameRoute>,
    cancel: CancellationToken,
    label: &'static str,
) where
    Si: Sink<M> + Unpin,
    Si::Error: Display,
    M: WireMessage,
{
    'routes: while let Some(route) = routes.recv().await {
        for frame in route.into_frames() {
            let closing = frame == Frame::Close;
            if let Err(e) = sink.send(M::from_frame(frame)).await {
                warn!(side = label, error = %e, "WebSocket write failed");
                cancel.cancel();
                return;
            }
            if closing {
                break 'routes;
            }
        }
    }

    let _ = sink.send(M::from_frame(Frame::Close)).await;
    let _ = sink.close().await;
    debug!(side = label, "Writer closed");
}
