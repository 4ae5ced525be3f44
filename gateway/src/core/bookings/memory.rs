use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{BookingResult, BookingStore, NewBooking, StoredBooking};

/// Process-local booking store.
///
/// Records live for the lifetime of the process; ids are random UUIDs.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    records: DashMap<String, StoredBooking>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<StoredBooking> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create(&self, booking: NewBooking) -> BookingResult<StoredBooking> {
        booking.validate()?;

        let stored = StoredBooking {
            id: uuid::Uuid::new_v4().to_string(),
            record: booking.into_record(),
        };
        self.records.insert(stored.id.clone(), stored.clone());
        debug!(booking_id = %stored.id, total = self.len(), "Stored booking in memory");
        Ok(stored)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
