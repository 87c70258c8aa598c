//! Inbound stream events.

use serde::Deserialize;

use crate::types::Usage;

/// One event decoded from the upstream model stream.
///
/// The upstream payloads are duck-typed JSON, so this enum is the validating
/// boundary: [`StreamEvent::from_json`] defaults optional fields and rejects
/// events with an unknown tag or a missing required field, which callers
/// treat as a no-op.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Fatal upstream error; fails the whole reply attempt.
    Error {
        /// Error message reported by the upstream service.
        #[serde(default)]
        message: String,
    },
    /// Incremental text fragment.
    TextDelta {
        /// The fragment, exactly as produced.
        #[serde(default)]
        delta: String,
    },
    /// Complete text, sent by providers that only deliver (or re-deliver)
    /// the full message at the end.
    TextDone {
        /// The full message text.
        #[serde(default)]
        text: String,
    },
    /// Incremental piece of a tool call.
    ToolDelta {
        /// Identifies which tool call the fragment belongs to.
        call_id: String,
        /// Tool name, when the fragment carries it.
        #[serde(default)]
        name: Option<String>,
        /// Incremental JSON argument text.
        #[serde(default)]
        arguments_delta: Option<String>,
        /// Upstream response id, needed to submit tool outputs back.
        #[serde(default)]
        response_id: Option<String>,
    },
    /// A tool call's fragments are complete and it is ready to run.
    ToolCompleted {
        /// The finished call's id.
        call_id: String,
    },
    /// The stream finished normally.
    StreamCompleted {
        /// Model identifier, when reported.
        #[serde(default)]
        model: Option<String>,
        /// Usage statistics, when reported.
        #[serde(default)]
        usage: Option<Usage>,
    },
}

impl StreamEvent {
    /// Lenient ingestion from a decoded JSON object.
    ///
    /// Returns `None` for unknown tags and for events missing a required
    /// field (e.g. a tool event without a call id); such events are skipped
    /// rather than treated as errors.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}
