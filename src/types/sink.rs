//! Outbound events for the downstream sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of one tool call's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    /// Accepted and waiting for a queue slot.
    Queued,
    /// An attempt is running.
    Executing,
    /// An attempt failed; another will follow.
    Retrying,
    /// Terminal: an attempt succeeded.
    Success,
    /// Terminal: all attempts failed, last failure was not a timeout.
    Error,
    /// Terminal: all attempts failed, last failure was a timeout.
    Timeout,
}

impl ToolCallStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Executing => "executing",
            Self::Retrying => "retrying",
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }

    /// Whether this status ends the call's lifecycle.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Timeout)
    }
}

/// Payload of a `tool_call` sink event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEvent {
    /// Upstream call id.
    pub id: String,
    /// Fresh id for this execution attempt group.
    pub task_id: String,
    /// Tool name.
    pub name: String,
    /// Parsed arguments.
    pub arguments: Value,
    /// Current lifecycle status.
    pub status: ToolCallStatus,
    /// Attempt number, on `retrying` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    /// Attempts left, on `retrying` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    /// Tool output, on terminal `success` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message, on terminal `error`/`timeout` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallEvent {
    /// Build a `queued` lifecycle event.
    pub fn queued(id: &str, task_id: &str, name: &str, arguments: &Value) -> Self {
        Self {
            id: id.to_string(),
            task_id: task_id.to_string(),
            name: name.to_string(),
            arguments: arguments.clone(),
            status: ToolCallStatus::Queued,
            attempt: None,
            remaining_attempts: None,
            result: None,
            error: None,
        }
    }
}

/// One event for the downstream consumer (e.g. an open SSE response).
#[derive(Debug, Clone)]
pub enum SinkEvent {
    /// An incremental text fragment, forwarded in arrival order.
    Delta {
        /// The fragment (never the cumulative message).
        delta: String,
    },
    /// A tool call lifecycle transition.
    ToolCall(ToolCallEvent),
}

impl SinkEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Delta { .. } => "delta",
            Self::ToolCall(_) => "tool_call",
        }
    }

    /// JSON payload of the event.
    pub fn data(&self) -> Value {
        match self {
            Self::Delta { delta } => serde_json::json!({ "delta": delta }),
            Self::ToolCall(event) => serde_json::to_value(event).unwrap_or(Value::Null),
        }
    }
}
