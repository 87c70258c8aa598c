//! Collaborator traits.
//!
//! The orchestrator owns no business logic: tool execution, run recording,
//! and downstream delivery are injected behind these seams so they can be
//! swapped for mocks in tests and for concrete services in an application.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::StreamerContext;
use crate::error::ReplyError;
use crate::types::SinkEvent;

/// Outcome of one tool invocation attempt.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Whether the tool handled the call successfully.
    pub ok: bool,
    /// Tool output, on success.
    pub result: Option<Value>,
    /// Failure description, otherwise.
    pub error: Option<String>,
}

impl ToolOutcome {
    /// A successful outcome carrying the tool's output.
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// A handled failure.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Executes tool calls requested by the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run a tool by name with parsed JSON arguments.
    ///
    /// A handled failure is reported through [`ToolOutcome::failure`]; the
    /// `Err` arm is for transport-level faults. Both are retried the same
    /// way.
    async fn execute(
        &self,
        name: &str,
        arguments: Value,
        ctx: &StreamerContext,
    ) -> Result<ToolOutcome, ReplyError>;
}

/// One run-recording entry for a finished tool execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Owning tenant.
    pub tenant_id: String,
    /// Conversation the run belongs to.
    pub conversation_id: String,
    /// AI configuration that produced the reply.
    pub config_id: String,
    /// Run classification (e.g. `tool_call`).
    pub run_type: String,
    /// What was asked of the tool.
    pub request_payload: Value,
    /// What the tool produced.
    pub response_payload: Value,
    /// Terminal status wire name.
    pub status: String,
    /// Wall-clock execution time in milliseconds.
    pub latency_ms: u64,
}

/// Persists run records for audit. Failures are logged by the caller and
/// never affect the reply.
#[async_trait]
pub trait RunRecorder: Send + Sync {
    /// Persist one record.
    async fn record(&self, record: RunRecord) -> Result<(), ReplyError>;
}

/// Downstream consumer of reply events (e.g. an open SSE response).
///
/// `send_event` is synchronous and must not fail in the happy path; the
/// orchestrator calls it from the event-handling path and from tool tasks.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn send_event(&self, event: &SinkEvent);
}
