//! Reply streaming orchestrator.
//!
//! [`ReplyStreamer`] is the single point of truth for one in-progress model
//! reply: it interprets inbound stream events, forwards text deltas to the
//! downstream sink in call order, assembles tool calls from fragments, and
//! schedules their execution on a bounded [`TaskQueue`] so tool latency
//! never delays text forwarding.

mod accumulator;
mod tool_task;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::config::{StreamerConfig, StreamerContext};
use crate::error::ReplyError;
use crate::queue::TaskQueue;
use crate::submit::ToolOutputClient;
use crate::traits::{EventSink, RunRecorder, ToolExecutor};
use crate::types::{SinkEvent, StreamEvent, StreamSummary, ToolCallEvent, ToolResult, Usage};

use accumulator::{ToolCallAcc, parse_args_best_effort};
use tool_task::ToolTask;

/// Injected collaborators for one reply.
#[derive(Clone)]
pub struct StreamerDeps {
    /// Runs tool calls requested by the model.
    pub executor: Arc<dyn ToolExecutor>,
    /// Persists run records; failures are logged, never surfaced.
    pub recorder: Arc<dyn RunRecorder>,
    /// Receives `delta` and `tool_call` events.
    pub sink: Arc<dyn EventSink>,
    /// Submits tool outputs back upstream. When `None`, a client is built
    /// from the config's `responses_api_url` and `api_key`; without those,
    /// submission is disabled.
    pub output_client: Option<Arc<ToolOutputClient>>,
}

/// Mutable reply state, shared between the event-handling path and tool
/// tasks. Guarded by one mutex; nothing holds it across an await.
#[derive(Default)]
pub(crate) struct ReplyState {
    pub message: String,
    pub model: Option<String>,
    pub usage: Option<Usage>,
    pub completed: bool,
    pub aborted: bool,
    pub pending_calls: HashMap<String, ToolCallAcc>,
    pub executed_calls: HashSet<String>,
    pub tool_results: Vec<ToolResult>,
}

/// Orchestrates one streamed model reply. Not reusable across replies.
///
/// Must be constructed inside a Tokio runtime (tool executions and the
/// cancellation watcher are spawned tasks). Feed events with
/// [`handle_event`](Self::handle_event) and close out with
/// [`finalize`](Self::finalize), exactly once, after the event source is
/// exhausted.
pub struct ReplyStreamer {
    state: Arc<Mutex<ReplyState>>,
    queue: Arc<TaskQueue>,
    deps: Arc<StreamerDeps>,
    config: Arc<StreamerConfig>,
    context: Arc<StreamerContext>,
    cancel: CancellationToken,
    _abort_watch: DropGuard,
}

impl ReplyStreamer {
    /// Create a streamer governed by `cancel`.
    ///
    /// When the token fires, the streamer marks itself aborted and cancels
    /// its queue: tasks not yet started are dropped, tasks already running
    /// finish naturally, and [`finalize`](Self::finalize) stops waiting.
    pub fn new(
        config: StreamerConfig,
        context: StreamerContext,
        deps: StreamerDeps,
        cancel: CancellationToken,
    ) -> Self {
        let mut deps = deps;
        if deps.output_client.is_none()
            && let (Some(url), Some(key)) = (&config.responses_api_url, &config.api_key)
        {
            deps.output_client = Some(Arc::new(ToolOutputClient::new(url.clone(), key.clone())));
        }

        let queue = TaskQueue::new(config.max_concurrency);
        let state = Arc::new(Mutex::new(ReplyState::default()));

        // Bridge the external signal to the queue. The watcher ends when
        // either the token fires or the streamer is dropped.
        let done = CancellationToken::new();
        let abort_watch = done.clone().drop_guard();
        {
            let cancel = cancel.clone();
            let queue = Arc::clone(&queue);
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        lock_state(&state).aborted = true;
                        queue.cancel();
                    }
                    _ = done.cancelled() => {}
                }
            });
        }

        Self {
            state,
            queue,
            deps: Arc::new(deps),
            config: Arc::new(config),
            context: Arc::new(context),
            cancel,
            _abort_watch: abort_watch,
        }
    }

    /// Ingest one decoded JSON object from the upstream stream.
    ///
    /// Unknown tags and malformed events are ignored.
    pub fn handle_json(&self, value: &Value) -> Result<(), ReplyError> {
        match StreamEvent::from_json(value) {
            Some(event) => self.handle_event(event),
            None => {
                tracing::debug!("ignoring unrecognized stream event");
                Ok(())
            }
        }
    }

    /// Dispatch one stream event. Synchronous; never blocks on I/O.
    ///
    /// Returns `Err` only for a fatal upstream `error` event, which fails
    /// the whole reply attempt.
    pub fn handle_event(&self, event: StreamEvent) -> Result<(), ReplyError> {
        match event {
            StreamEvent::Error { message } => Err(ReplyError::Stream(message)),
            StreamEvent::TextDelta { delta } => {
                if !delta.is_empty() {
                    lock_state(&self.state).message.push_str(&delta);
                    self.deps.sink.send_event(&SinkEvent::Delta { delta });
                }
                Ok(())
            }
            StreamEvent::TextDone { text } => {
                let mut state = lock_state(&self.state);
                // A full-text event may only lengthen the message; a delta
                // stream that already counted more wins.
                if text.len() > state.message.len() {
                    state.message = text;
                }
                Ok(())
            }
            StreamEvent::ToolDelta {
                call_id,
                name,
                arguments_delta,
                response_id,
            } => {
                lock_state(&self.state)
                    .pending_calls
                    .entry(call_id)
                    .or_default()
                    .apply(name, arguments_delta, response_id);
                Ok(())
            }
            StreamEvent::ToolCompleted { call_id } => {
                self.on_tool_completed(call_id);
                Ok(())
            }
            StreamEvent::StreamCompleted { model, usage } => {
                let mut state = lock_state(&self.state);
                state.completed = true;
                if model.is_some() {
                    state.model = model;
                }
                if usage.is_some() {
                    state.usage = usage;
                }
                Ok(())
            }
        }
    }

    /// Mark the call executed, announce it as queued, and schedule its
    /// execution. Duplicate completions for the same call id are ignored.
    fn on_tool_completed(&self, call_id: String) {
        let acc = {
            let mut state = lock_state(&self.state);
            if state.executed_calls.contains(&call_id) {
                tracing::debug!(%call_id, "duplicate tool_completed ignored");
                return;
            }
            state.executed_calls.insert(call_id.clone());
            state.pending_calls.remove(&call_id).unwrap_or_default()
        };

        let task_id = Uuid::new_v4().to_string();
        let name = acc.name.unwrap_or_default();
        let arguments = parse_args_best_effort(&call_id, &acc.args_json);

        self.deps
            .sink
            .send_event(&SinkEvent::ToolCall(ToolCallEvent::queued(
                &call_id, &task_id, &name, &arguments,
            )));

        let task = ToolTask {
            call_id,
            task_id,
            name,
            arguments,
            response_id: acc.response_id,
            started: Instant::now(),
            state: Arc::clone(&self.state),
            deps: Arc::clone(&self.deps),
            config: Arc::clone(&self.config),
            context: Arc::clone(&self.context),
            cancel: self.cancel.clone(),
        };
        self.queue.enqueue(task.run());
    }

    /// Whether the external abort signal has fired.
    pub fn is_aborted(&self) -> bool {
        lock_state(&self.state).aborted
    }

    /// Wait for all scheduled tool executions to drain, then return the
    /// aggregated summary. Consumes the streamer: one reply, one finalize.
    pub async fn finalize(self) -> StreamSummary {
        self.queue.wait_for_idle().await;
        let state = lock_state(&self.state);
        StreamSummary {
            message: state.message.clone(),
            model: state.model.clone().unwrap_or_default(),
            usage: state.usage.clone(),
            completed: state.completed,
            tool_calls: state.tool_results.clone(),
        }
    }
}

pub(crate) fn lock_state(state: &Mutex<ReplyState>) -> std::sync::MutexGuard<'_, ReplyState> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
