//! Upstream dialing.
//!
//! The relay never opens sockets itself; it asks an [`UpstreamConnector`] for
//! a pumped [`FrameLink`]. Production uses [`OpenAIConnector`]; tests hand
//! the relay an in-memory link instead.

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::{self, client::IntoClientRequest, http::HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use zeroize::Zeroize;

use super::config::RealtimeSettings;
use super::transport::FrameLink;
use crate::core::relay::RelayError;

/// Opens the upstream side of a relay session.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    /// Dial upstream and start its pumps. The pumps stop when `cancel` fires.
    async fn connect(&self, cancel: CancellationToken) -> Result<FrameLink, RelayError>;
}

/// Connector for the hosted realtime API.
pub struct OpenAIConnector {
    url: String,
    api_key: String,
}

impl OpenAIConnector {
    pub fn new(settings: &RealtimeSettings, api_key: impl Into<String>) -> Self {
        Self {
            url: settings.ws_url(),
            api_key: api_key.into(),
        }
    }

    fn build_request(&self) -> Result<tungstenite::handshake::client::Request, RelayError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| RelayError::UpstreamDial(e.to_string()))?;

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| RelayError::UpstreamDial(format!("invalid API key header: {e}")))?;
        let headers = request.headers_mut();
        headers.insert("Authorization", auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        Ok(request)
    }
}

impl Drop for OpenAIConnector {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

#[async_trait]
impl UpstreamConnector for OpenAIConnector {
    async fn connect(&self, cancel: CancellationToken) -> Result<FrameLink, RelayError> {
        let request = self.build_request()?;

        let (socket, response) = match tokio_tungstenite::connect_async(request).await {
            Ok(connected) => connected,
            Err(tungstenite::Error::Http(response)) => {
                let status = response.status().as_u16();
                let body = response
                    .body()
                    .as_deref()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default();
                error!(status, body = %body, "Upstream rejected the handshake");
                return Err(RelayError::UpstreamRejected { status, body });
            }
            Err(e) => return Err(RelayError::UpstreamDial(e.to_string())),
        };

        info!(
            status = response.status().as_u16(),
            "Connected to realtime API"
        );
        Ok(FrameLink::spawn(socket, cancel, "upstream"))
    }
}
