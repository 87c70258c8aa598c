//! Aggregated reply summary types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ToolCallStatus;

/// Token usage reported by the upstream provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Tokens generated for the reply.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: u64,
}

/// Terminal outcome of one tool call.
///
/// Created once per call id when execution finishes (success or exhausted
/// retries) and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Upstream call id.
    pub call_id: String,
    /// Id of the execution attempt group.
    pub task_id: String,
    /// Tool name.
    pub name: String,
    /// Parsed arguments (empty object when the streamed text was not valid
    /// JSON).
    pub arguments: Value,
    /// Terminal status.
    pub status: ToolCallStatus,
    /// Tool output, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message, otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only view of a finished reply, built on demand by
/// [`crate::ReplyStreamer::finalize`].
#[derive(Debug, Clone, Serialize)]
pub struct StreamSummary {
    /// The aggregated message text.
    pub message: String,
    /// Model identifier, empty when the upstream never reported one.
    pub model: String,
    /// Usage statistics, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Whether the stream finished normally.
    pub completed: bool,
    /// Terminal outcomes of every executed tool call.
    pub tool_calls: Vec<ToolResult>,
}
