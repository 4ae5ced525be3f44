pub mod audio;
pub mod bookings;
pub mod knowledge;
pub mod realtime;
pub mod relay;
pub mod tools;

// Re-export commonly used types for convenience
pub use audio::{AudioFrame, CodecError, FrameDirection, SAMPLE_RATE};
pub use bookings::{
    BookingStore, BookingStoreError, InMemoryBookingStore, NewBooking, RestBookingStore,
    SharedBookingStore, StoredBooking,
};
pub use knowledge::{KnowledgeBase, KnowledgeBaseError};
pub use realtime::{
    ClientEvent, Frame, FrameLink, FrameRoute, OpenAIConnector, ParsedFrame, RealtimeSettings,
    UpstreamConnector, UpstreamEvent,
};
pub use relay::{RelayError, RelayOutcome, RelaySession, RelayState};
pub use tools::{ToolCall, ToolDispatcher, ToolResult};
