//! Server-side tools invoked by the realtime assistant.
//!
//! Tool calls arrive as `response.function_call_arguments.done` events. The
//! dispatcher validates the argument payload against the tool's
//! [`ToolDescriptor`], runs it against the knowledge base or the booking
//! store, and always answers with a [`ToolResult`]. Failures are results,
//! never errors.

mod arguments;
pub mod descriptor;
mod dispatcher;
mod result;

pub use arguments::{ToolArguments, ToolError};
pub use descriptor::{ParamSpec, ParamType, TOOL_CATALOGUE, ToolDescriptor, find_tool};
pub use dispatcher::{ToolCall, ToolDispatcher};
pub use result::ToolResult;
