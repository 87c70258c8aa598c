//! Event and summary types.
//!
//! Inbound events from the upstream model stream, outbound events for the
//! downstream sink, and the aggregated summary returned by
//! [`crate::ReplyStreamer::finalize`].

mod events;
mod sink;
mod summary;

pub use events::StreamEvent;
pub use sink::{SinkEvent, ToolCallEvent, ToolCallStatus};
pub use summary::{StreamSummary, ToolResult, Usage};
