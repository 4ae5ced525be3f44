use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::info;

use crate::core::bookings::NewBooking;
use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookingCreated {
    pub id: String,
}

/// `POST /api/bookings`
///
/// Persists through the same store the assistant's `createBooking` tool uses.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(booking): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<BookingCreated>)> {
    let stored = state.bookings.create(booking).await?;
    info!(booking_id = %stored.id, store = state.bookings.name(), "Booking created");
    Ok((StatusCode::CREATED, Json(BookingCreated { id: stored.id })))
}
