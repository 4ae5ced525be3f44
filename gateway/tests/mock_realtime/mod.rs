//! Scriptable WebSocket peer for relay and client tests.
//!
//! Accepts exactly one connection. Every text frame it receives is parsed
//! and pushed to `received`; every value sent on `inject` is written back as
//! a text frame. Dropping `inject` makes the peer send Close and hang up.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        Message,
        handshake::server::{ErrorResponse, Request, Response},
    },
};

/// Headers and URI of the handshake the peer accepted
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    pub uri: String,
    pub authorization: Option<String>,
    pub openai_beta: Option<String>,
}

pub struct MockPeer {
    pub url: String,
    pub received: mpsc::UnboundedReceiver<Value>,
    pub inject: mpsc::UnboundedSender<Value>,
    pub handshake: oneshot::Receiver<Handshake>,
}

impl MockPeer {
    /// Next parsed frame from the connected side, failing after `wait`.
    pub async fn next_event(&mut self, wait: Duration) -> Option<Value> {
        tokio::time::timeout(wait, self.received.recv())
            .await
            .ok()
            .flatten()
    }

    /// Make the peer send Close and disconnect.
    pub fn hang_up(&mut self) {
        let (closed, _) = mpsc::unbounded_channel();
        self.inject = closed;
    }

    /// Send one event to the connected side.
    pub fn send(&self, event: Value) {
        self.inject.send(event).expect("mock peer is gone");
    }
}

pub async fn spawn_mock_peer(path: &str) -> MockPeer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (received_tx, received_rx) = mpsc::unbounded_channel();
    let (inject_tx, mut inject_rx) = mpsc::unbounded_channel::<Value>();
    let (handshake_tx, handshake_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };

        let record = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let header = |name: &str| {
                request
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let _ = handshake_tx.send(Handshake {
                uri: request.uri().to_string(),
                authorization: header("authorization"),
                openai_beta: header("openai-beta"),
            });
            Ok(response)
        };

        let Ok(ws) = accept_hdr_async(stream, record).await else {
            return;
        };
        let (mut write, mut read) = ws.split();

        loop {
            tokio::select! {
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(value) = serde_json::from_str::<Value>(text.as_str()) {
                            let _ = received_tx.send(value);
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
                outgoing = inject_rx.recv() => match outgoing {
                    Some(value) => {
                        if write.send(Message::Text(value.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                },
            }
        }
    });

    MockPeer {
        url: format!("ws://{addr}{path}"),
        received: received_rx,
        inject: inject_tx,
        handshake: handshake_rx,
    }
}
