//! Booking persistence.
//!
//! Bookings are the one read/write collaborator behind the assistant's tools.
//! The store is constructed once at startup and shared through `AppState`
//! with both the tool dispatcher and the HTTP booking endpoint.
//!
//! # Backends
//!
//! - [`InMemoryBookingStore`] - process-local map, used by default and in tests
//! - [`RestBookingStore`] - JSON document API reached over HTTP

mod memory;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use memory::InMemoryBookingStore;
pub use rest::RestBookingStore;

/// Errors raised by booking stores.
#[derive(Debug, Error)]
pub enum BookingStoreError {
    /// A required booking field was empty
    #[error("Invalid booking: {0}")]
    Validation(String),

    /// The backend could not be reached
    #[error("Booking store request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status
    #[error("Booking store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answer could not be decoded
    #[error("Invalid booking store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BookingStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BookingStoreError::Decode(err.to_string())
        } else {
            BookingStoreError::Request(err.to_string())
        }
    }
}

/// Result type for booking operations.
pub type BookingResult<T> = Result<T, BookingStoreError>;

/// Booking request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl NewBooking {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Reject blank fields. Format checks are left to the business owner.
    pub fn validate(&self) -> BookingResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(BookingStoreError::Validation(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Attach the server-assigned timestamp.
    pub fn into_record(self) -> BookingRecord {
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string());
        BookingRecord {
            name: self.name,
            email: self.email,
            phone: self.phone,
            created_at,
        }
    }
}

/// Document written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// RFC 3339 timestamp assigned when the booking was accepted
    pub created_at: String,
}

/// A persisted booking and its store-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBooking {
    pub id: String,
    #[serde(flatten)]
    pub record: BookingRecord,
}

/// Persistence backend for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Validate, timestamp and persist a booking.
    async fn create(&self, booking: NewBooking) -> BookingResult<StoredBooking>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Shared handle to the configured store.
pub type SharedBookingStore = Arc<dyn BookingStore>;
