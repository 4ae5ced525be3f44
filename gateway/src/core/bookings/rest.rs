use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;
use zeroize::Zeroize;

use super::{BookingResult, BookingStore, BookingStoreError, NewBooking, StoredBooking};

/// Collection the bookings are written to.
const BOOKINGS_COLLECTION: &str = "bookings";

/// Document API answer to a create request.
#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

/// Booking store backed by a JSON document API.
///
/// Each booking is `POST`ed to `{base_url}/bookings`; the backend must answer
/// with a JSON object carrying the assigned `id`.
pub struct RestBookingStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RestBookingStore {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
    ) -> BookingResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| BookingStoreError::Request(format!("invalid base URL: {e}")))?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(BOOKINGS_COLLECTION)
            .map_err(|e| BookingStoreError::Request(format!("invalid base URL: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Drop for RestBookingStore {
    fn drop(&mut self) {
        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

#[async_trait]
impl BookingStore for RestBookingStore {
    async fn create(&self, booking: NewBooking) -> BookingResult<StoredBooking> {
        booking.validate()?;
        let record = booking.into_record();

        let mut request = self.client.post(self.endpoint.clone()).json(&record);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Booking store rejected document");
            return Err(BookingStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedDocument = response.json().await?;
        debug!(booking_id = %created.id, "Stored booking via document API");

        Ok(StoredBooking {
            id: created.id,
            record,
        })
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
