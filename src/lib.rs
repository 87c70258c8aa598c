//! replyflow
//!
//! Streaming reply orchestration for model responses that interleave text
//! with tool calls. The crate consumes an incremental, event-based model
//! reply, forwards text fragments to a downstream sink in real time, and —
//! concurrently, without stalling that forwarding — detects, executes,
//! retries, times out, and reports tool calls requested mid-stream.
//!
//! The central piece is [`ReplyStreamer`]: feed it [`StreamEvent`]s as they
//! arrive, then call [`ReplyStreamer::finalize`] once the upstream stream is
//! exhausted to obtain the aggregated [`StreamSummary`]. Tool executions run
//! on a [`TaskQueue`] bounded by the configured concurrency limit, so a slow
//! tool never delays subsequent text deltas.
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod queue;
pub mod submit;
pub mod traits;
pub mod types;

pub use config::{StreamerConfig, StreamerContext};
pub use error::ReplyError;
pub use orchestrator::{ReplyStreamer, StreamerDeps};
pub use queue::TaskQueue;
pub use submit::ToolOutputClient;
pub use traits::{EventSink, RunRecord, RunRecorder, ToolExecutor, ToolOutcome};
pub use types::{
    SinkEvent, StreamEvent, StreamSummary, ToolCallEvent, ToolCallStatus, ToolResult, Usage,
};

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::config::{StreamerConfig, StreamerContext};
    pub use crate::error::ReplyError;
    pub use crate::orchestrator::{ReplyStreamer, StreamerDeps};
    pub use crate::submit::ToolOutputClient;
    pub use crate::traits::{EventSink, RunRecord, RunRecorder, ToolExecutor, ToolOutcome};
    pub use crate::types::{
        SinkEvent, StreamEvent, StreamSummary, ToolCallEvent, ToolCallStatus, ToolResult, Usage,
    };
}
