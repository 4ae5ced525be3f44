//! Shared application state.
//!
//! Built once at startup and handed to every handler behind an `Arc`. Relay
//! sessions share only the knowledge base and the booking store through it.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::bookings::{
    BookingStoreError, InMemoryBookingStore, RestBookingStore, SharedBookingStore,
};
use crate::core::knowledge::{KnowledgeBase, KnowledgeBaseError};
use crate::core::realtime::{OpenAIConnector, SessionConfig, UpstreamConnector};
use crate::core::tools::ToolDispatcher;

/// Timeout for REST collaborators (booking store, chat completions).
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Knowledge(#[from] KnowledgeBaseError),

    #[error(transparent)]
    Bookings(#[from] BookingStoreError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct AppState {
    pub config: ServerConfig,
    pub knowledge: Arc<KnowledgeBase>,
    pub bookings: SharedBookingStore,
    pub dispatcher: ToolDispatcher,
    /// Sent upstream as `session.update` at the start of every relay session
    pub session_config: SessionConfig,
    /// `None` when no API key is configured; realtime upgrades are refused
    pub connector: Option<Arc<dyn UpstreamConnector>>,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Load the knowledge base, build the booking store and the upstream
    /// connector described by `config`.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, StateError> {
        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let knowledge = match &config.knowledge_base_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Loading knowledge base");
                KnowledgeBase::load_from_dir(dir)?
            }
            None => KnowledgeBase::builtin()?,
        };

        let bookings: SharedBookingStore = match &config.booking_store_url {
            Some(url) => Arc::new(RestBookingStore::new(
                http_client.clone(),
                url,
                config.booking_store_api_key.clone(),
            )?),
            None => Arc::new(InMemoryBookingStore::new()),
        };

        let connector = config.api_key().map(|key| {
            Arc::new(OpenAIConnector::new(&config.realtime, key)) as Arc<dyn UpstreamConnector>
        });

        Ok(Self::from_parts(
            config,
            Arc::new(knowledge),
            bookings,
            connector,
            http_client,
        ))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        config: ServerConfig,
        knowledge: Arc<KnowledgeBase>,
        bookings: SharedBookingStore,
        connector: Option<Arc<dyn UpstreamConnector>>,
        http_client: reqwest::Client,
    ) -> Arc<Self> {
        let dispatcher = ToolDispatcher::new(knowledge.clone(), bookings.clone());
        let session_config = config.realtime.session_config(dispatcher.descriptors());

        info!(
            employees = knowledge.employees().len(),
            booking_store = bookings.name(),
            realtime = connector.is_some(),
            "Application state ready"
        );

        Arc::new(Self {
            config,
            knowledge,
            bookings,
            dispatcher,
            session_config,
            connector,
            http_client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_builtin_data_and_memory_store() {
        let state = AppState::new(ServerConfig::default()).unwrap();

        assert_eq!(state.bookings.name(), "memory");
        assert!(state.connector.is_none());
        assert_eq!(state.knowledge.employees().len(), 8);
        assert_eq!(state.session_config.tools.len(), 9);
    }

    #[test]
    fn test_api_key_enables_realtime() {
        let mut config = ServerConfig::default();
        config.openai_api_key = Some("sk-test".to_string());
        config.booking_store_url = Some("http://localhost:7000".to_string());

        let state = AppState::new(config).unwrap();

        assert!(state.connector.is_some());
        assert_eq!(state.bookings.name(), "rest");
    }
}
