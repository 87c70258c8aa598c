//! Tool execution task.
//!
//! Runs exactly one tool invocation to a terminal state: races the executor
//! against the configured timeout, retries up to the configured bound,
//! reports every lifecycle transition to the sink, and fans the terminal
//! outcome out to the run recorder and the upstream tool-output endpoint.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{StreamerConfig, StreamerContext};
use crate::traits::RunRecord;
use crate::types::{SinkEvent, ToolCallEvent, ToolCallStatus, ToolResult};

use super::{ReplyState, StreamerDeps, lock_state};

pub(crate) struct ToolTask {
    pub call_id: String,
    pub task_id: String,
    pub name: String,
    pub arguments: Value,
    pub response_id: Option<String>,
    pub started: Instant,
    pub state: Arc<Mutex<ReplyState>>,
    pub deps: Arc<StreamerDeps>,
    pub config: Arc<StreamerConfig>,
    pub context: Arc<StreamerContext>,
    pub cancel: CancellationToken,
}

/// What an attempt loop ended with.
enum LoopOutcome {
    Success(Option<Value>),
    Failed { last_error: String, timed_out: bool },
    CancelledEarly,
}

impl ToolTask {
    /// Drive the call to a terminal state and report it. Exits silently when
    /// the reply was cancelled before a terminal state was reached.
    pub async fn run(self) {
        // A task spawned before the abort fired may still be polled after it;
        // it must not announce execution it will never perform.
        if self.cancel.is_cancelled() {
            tracing::debug!(call_id = %self.call_id, "tool task dropped before start");
            return;
        }

        self.emit(ToolCallEvent {
            status: ToolCallStatus::Executing,
            ..self.base_event()
        });

        let (status, result, error) = match self.attempt_loop().await {
            LoopOutcome::Success(value) => (ToolCallStatus::Success, value, None),
            LoopOutcome::Failed {
                last_error,
                timed_out,
            } => {
                let status = if timed_out {
                    ToolCallStatus::Timeout
                } else {
                    ToolCallStatus::Error
                };
                (status, None, Some(last_error))
            }
            LoopOutcome::CancelledEarly => {
                tracing::debug!(
                    call_id = %self.call_id,
                    "tool task cancelled before reaching a terminal state"
                );
                return;
            }
        };

        let tool_result = ToolResult {
            call_id: self.call_id.clone(),
            task_id: self.task_id.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
            status,
            result: result.clone(),
            error: error.clone(),
        };
        lock_state(&self.state).tool_results.push(tool_result);

        self.spawn_run_recording(status, &result, &error);
        if status == ToolCallStatus::Success {
            self.spawn_output_submission(&result);
        }

        self.emit(ToolCallEvent {
            status,
            result,
            error,
            ..self.base_event()
        });
    }

    /// Run up to `max_retries + 1` attempts, stopping early on success or
    /// cancellation.
    async fn attempt_loop(&self) -> LoopOutcome {
        let attempts = self.config.max_retries.saturating_add(1).max(1);
        let mut last_error = String::new();
        let mut timed_out = false;

        for attempt in 1..=attempts {
            if self.cancel.is_cancelled() {
                return LoopOutcome::CancelledEarly;
            }

            match self.attempt_once().await {
                AttemptOutcome::Success(value) => return LoopOutcome::Success(value),
                AttemptOutcome::Failure(message) => {
                    last_error = message;
                    timed_out = false;
                }
                AttemptOutcome::TimedOut(message) => {
                    last_error = message;
                    timed_out = true;
                }
            }
            tracing::debug!(
                call_id = %self.call_id,
                tool = %self.name,
                attempt,
                error = %last_error,
                "tool attempt failed"
            );

            if attempt < attempts && !self.cancel.is_cancelled() {
                self.emit(ToolCallEvent {
                    status: ToolCallStatus::Retrying,
                    attempt: Some(attempt),
                    remaining_attempts: Some(attempts - attempt),
                    error: Some(last_error.clone()),
                    ..self.base_event()
                });
                if !self.config.retry_delay.is_zero() {
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }

        LoopOutcome::Failed {
            last_error,
            timed_out,
        }
    }

    /// One executor invocation, raced against the timeout when one is
    /// configured.
    async fn attempt_once(&self) -> AttemptOutcome {
        let call = self
            .deps
            .executor
            .execute(&self.name, self.arguments.clone(), &self.context);

        let completed = match self.config.tool_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    return AttemptOutcome::TimedOut(format!(
                        "tool timed out after {}ms",
                        limit.as_millis()
                    ));
                }
            },
            None => call.await,
        };

        match completed {
            Ok(outcome) if outcome.ok => AttemptOutcome::Success(outcome.result),
            Ok(outcome) => AttemptOutcome::Failure(
                outcome
                    .error
                    .unwrap_or_else(|| "tool reported failure".to_string()),
            ),
            Err(error) => AttemptOutcome::Failure(error.to_string()),
        }
    }

    /// Fire-and-forget run recording; failures are logged only.
    fn spawn_run_recording(
        &self,
        status: ToolCallStatus,
        result: &Option<Value>,
        error: &Option<String>,
    ) {
        let record = RunRecord {
            tenant_id: self.context.tenant_id.clone(),
            conversation_id: self.context.conversation_id.clone(),
            config_id: self.context.config_id.clone(),
            run_type: self.context.run_type.clone(),
            request_payload: serde_json::json!({
                "tool": self.name,
                "arguments": self.arguments,
            }),
            response_payload: serde_json::json!({
                "status": status.as_str(),
                "result": result,
                "error": error,
            }),
            status: status.as_str().to_string(),
            latency_ms: self.started.elapsed().as_millis() as u64,
        };
        let recorder = Arc::clone(&self.deps.recorder);
        let call_id = self.call_id.clone();
        tokio::spawn(async move {
            if let Err(error) = recorder.record(record).await {
                tracing::warn!(%call_id, %error, "failed to record tool run");
            }
        });
    }

    /// Fire-and-forget submission of the output back upstream; requires a
    /// response id from the stream and a configured client. Failures are
    /// logged only.
    fn spawn_output_submission(&self, outcome: &Option<Value>) {
        let (Some(client), Some(response_id)) = (&self.deps.output_client, &self.response_id)
        else {
            return;
        };
        let client = Arc::clone(client);
        let response_id = response_id.clone();
        let call_id = self.call_id.clone();
        let output = outcome.clone().unwrap_or(Value::Null);
        tokio::spawn(async move {
            if let Err(error) = client.submit(&response_id, &call_id, &output).await {
                tracing::warn!(%call_id, %error, "failed to submit tool output upstream");
            }
        });
    }

    fn base_event(&self) -> ToolCallEvent {
        ToolCallEvent {
            id: self.call_id.clone(),
            task_id: self.task_id.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
            status: ToolCallStatus::Queued,
            attempt: None,
            remaining_attempts: None,
            result: None,
            error: None,
        }
    }

    fn emit(&self, event: ToolCallEvent) {
        self.deps.sink.send_event(&SinkEvent::ToolCall(event));
    }
}

enum AttemptOutcome {
    Success(Option<Value>),
    Failure(String),
    TimedOut(String),
}
