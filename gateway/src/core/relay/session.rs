use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{RelayError, RelayState};
use crate::core::realtime::{
    ClientEvent, Frame, FrameLink, FrameRoute, ParsedFrame, SessionConfig, UpstreamConnector,
    UpstreamEvent,
};
use crate::core::tools::{ToolCall, ToolDispatcher};

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub session_id: Uuid,
    /// Whether the upstream was opened and configured
    pub reached_active: bool,
    /// Tool calls dispatched during the session
    pub tool_calls: usize,
}

/// One client connection paired with one upstream session.
pub struct RelaySession {
    id: Uuid,
    state: RelayState,
    session_config: SessionConfig,
    dispatcher: ToolDispatcher,
}

impl RelaySession {
    pub fn new(session_config: SessionConfig, dispatcher: ToolDispatcher) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RelayState::Connecting,
            session_config,
            dispatcher,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    fn transition(&mut self, next: RelayState) {
        debug!(session_id = %self.id, from = %self.state, to = %next, "Relay state change");
        self.state = next;
    }

    /// Drive the session until both sides are closed.
    ///
    /// `cancel` is the session-wide close signal; the client pumps must have
    /// been spawned with it.
    pub async fn run<C>(
        mut self,
        client: FrameLink,
        connector: &C,
        cancel: CancellationToken,
    ) -> RelayOutcome
    where
        C: UpstreamConnector + ?Sized,
    {
        let session_id = self.id;
        info!(session_id = %session_id, "Relay session connecting upstream");

        let upstream = match connector.connect(cancel.clone()).await {
            Ok(link) => link,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Upstream dial failed");
                self.transition(RelayState::Closing);
                // Dropping the client link makes its writer send Close
                drop(client);
                cancel.cancel();
                self.transition(RelayState::Closed);
                return RelayOutcome {
                    session_id,
                    reached_active: false,
                    tool_calls: 0,
                };
            }
        };

        if let Err(e) = self.send_session_update(&upstream.sender).await {
            error!(session_id = %session_id, error = %e, "Failed to configure upstream session");
            self.transition(RelayState::Closing);
            drop(client);
            drop(upstream);
            cancel.cancel();
            self.transition(RelayState::Closed);
            return RelayOutcome {
                session_id,
                reached_active: false,
                tool_calls: 0,
            };
        }

        self.transition(RelayState::Active);
        info!(session_id = %session_id, "Relay session active");

        let tool_calls = Arc::new(AtomicUsize::new(0));
        let FrameLink {
            sender: client_tx,
            receiver: client_rx,
        } = client;
        let FrameLink {
            sender: upstream_tx,
            receiver: upstream_rx,
        } = upstream;

        tokio::join!(
            client_to_upstream(session_id, client_rx, upstream_tx.clone(), cancel.clone()),
            upstream_to_client(
                session_id,
                upstream_rx,
                client_tx,
                upstream_tx,
                self.dispatcher.clone(),
                tool_calls.clone(),
                cancel.clone(),
            ),
        );

        self.transition(RelayState::Closing);
        cancel.cancel();
        self.transition(RelayState::Closed);

        let tool_calls = tool_calls.load(Ordering::Relaxed);
        info!(session_id = %session_id, tool_calls, "Relay session closed");
        RelayOutcome {
            session_id,
            reached_active: true,
            tool_calls,
        }
    }

    async fn send_session_update(
        &self,
        upstream: &mpsc::Sender<FrameRoute>,
    ) -> Result<(), RelayError> {
        let event = ClientEvent::SessionUpdate {
            session: self.session_config.clone(),
        };
        let json = event.to_json()?;
        upstream
            .send(Frame::Text(json).into())
            .await
            .map_err(|_| RelayError::ChannelClosed("upstream"))?;
        debug!(
            session_id = %self.id,
            tools = self.session_config.tools.len(),
            "Sent session.update"
        );
        Ok(())
    }
}

/// Forward client frames upstream until either side goes away.
async fn client_to_upstream(
    session_id: Uuid,
    mut client_rx: mpsc::Receiver<Frame>,
    upstream_tx: mpsc::Sender<FrameRoute>,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = client_rx.recv() => frame,
        };

        let Some(frame) = frame else {
            info!(session_id = %session_id, "Client disconnected");
            break;
        };

        let forward = match ParsedFrame::classify(&frame) {
            Some(ParsedFrame::Text(_)) => match frame {
                Frame::Binary(data) => Frame::Text(String::from_utf8_lossy(&data).into_owned()),
                other => other,
            },
            Some(ParsedFrame::Malformed(reason)) => {
                warn!(session_id = %session_id, error = %reason, "Dropping malformed client frame");
                continue;
            }
            Some(ParsedFrame::Binary(data)) => {
                debug!(session_id = %session_id, bytes = data.len(), "Dropping binary client frame");
                continue;
            }
            None => continue,
        };

        if upstream_tx.send(forward.into()).await.is_err() {
            debug!(session_id = %session_id, "Upstream writer gone");
            break;
        }
    }

    cancel.cancel();
}

/// Forward upstream frames to the client, then inspect them for tool calls.
async fn upstream_to_client(
    session_id: Uuid,
    mut upstream_rx: mpsc::Receiver<Frame>,
    client_tx: mpsc::Sender<FrameRoute>,
    upstream_tx: mpsc::Sender<FrameRoute>,
    dispatcher: ToolDispatcher,
    tool_calls: Arc<AtomicUsize>,
    cancel: CancellationToken,
) {
    // call_id -> tool name, learned from response.output_item.added
    let mut pending_calls: HashMap<String, String> = HashMap::new();

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = upstream_rx.recv() => frame,
        };

        let Some(frame) = frame else {
            info!(session_id = %session_id, "Upstream disconnected");
            break;
        };

        let parsed = ParsedFrame::classify(&frame);

        if client_tx.send(frame.into()).await.is_err() {
            debug!(session_id = %session_id, "Client writer gone");
            break;
        }

        let value = match parsed {
            Some(ParsedFrame::Text(value)) => value,
            Some(ParsedFrame::Malformed(reason)) => {
                debug!(session_id = %session_id, error = %reason, "Forwarded unparseable upstream frame");
                continue;
            }
            Some(ParsedFrame::Binary(_)) | None => continue,
        };

        let event = match UpstreamEvent::from_value(&value) {
            Ok(event) => event,
            Err(e) => {
                debug!(session_id = %session_id, error = %e, "Upstream event not interpreted");
                continue;
            }
        };

        match event {
            UpstreamEvent::OutputItemAdded { item } if item.item_type == "function_call" => {
                if let (Some(call_id), Some(name)) = (item.call_id, item.name) {
                    debug!(session_id = %session_id, call_id = %call_id, tool = %name, "Tracking function call");
                    pending_calls.insert(call_id, name);
                }
            }
            UpstreamEvent::FunctionCallArgumentsDone {
                call_id,
                name,
                arguments,
            } => {
                let tracked = pending_calls.remove(&call_id);
                let name = name.filter(|n| !n.is_empty()).or(tracked).unwrap_or_else(|| {
                    warn!(session_id = %session_id, call_id = %call_id, "Function name not found for call");
                    String::new()
                });

                tool_calls.fetch_add(1, Ordering::Relaxed);
                spawn_tool_call(
                    session_id,
                    ToolCall {
                        call_id,
                        name,
                        arguments,
                    },
                    dispatcher.clone(),
                    upstream_tx.clone(),
                );
            }
            UpstreamEvent::Error { error } => {
                warn!(session_id = %session_id, message = %error.message, "Upstream reported an error");
            }
            _ => {}
        }
    }

    cancel.cancel();
}

/// Run a tool and queue its result and the continue request as one unit.
///
/// The task is never cancelled; the result is written if the upstream writer
/// is still running when it completes.
fn spawn_tool_call(
    session_id: Uuid,
    call: ToolCall,
    dispatcher: ToolDispatcher,
    upstream_tx: mpsc::Sender<FrameRoute>,
) {
    tokio::spawn(async move {
        let result = dispatcher.dispatch_call(&call).await;

        let frames = [
            ClientEvent::function_call_output(call.call_id.as_str(), result.to_output()),
            ClientEvent::ResponseCreate,
        ]
        .iter()
        .map(|event| event.to_json().map(Frame::Text))
        .collect::<Result<Vec<_>, _>>();

        let frames = match frames {
            Ok(frames) => frames,
            Err(e) => {
                error!(session_id = %session_id, call_id = %call.call_id, error = %e, "Failed to encode tool result");
                return;
            }
        };

        if upstream_tx.send(FrameRoute::Sequence(frames)).await.is_err() {
            warn!(
                session_id = %session_id,
                call_id = %call.call_id,
                "Upstream closed before the tool result could be sent"
            );
        } else {
            debug!(session_id = %session_id, call_id = %call.call_id, success = result.is_success(), "Tool result sent");
        }
    });
}
