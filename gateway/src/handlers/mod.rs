//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and the unknown-path fallback
//! - `ai` - Text generation and chat pass-throughs
//! - `bookings` - Booking creation
//! - `realtime` - Voice relay WebSocket upgrade

pub mod ai;
pub mod api;
pub mod bookings;
pub mod realtime;

pub use realtime::realtime_handler;
