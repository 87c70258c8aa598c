//! Per-call-id assembly of streamed tool calls.

use serde_json::Value;

/// State for one tool call while its fragments are still arriving.
///
/// Owned exclusively by the orchestrator's pending map and removed the
/// moment the call's completion event is observed.
#[derive(Debug, Default, Clone)]
pub(crate) struct ToolCallAcc {
    /// Tool name; later non-empty values overwrite earlier ones.
    pub name: Option<String>,
    /// Argument fragments appended in arrival order.
    pub args_json: String,
    /// Upstream response id for tool-output submission.
    pub response_id: Option<String>,
}

impl ToolCallAcc {
    /// Fold one `tool_delta` fragment into the accumulator.
    pub fn apply(
        &mut self,
        name: Option<String>,
        arguments_delta: Option<String>,
        response_id: Option<String>,
    ) {
        if let Some(name) = name
            && !name.trim().is_empty()
        {
            self.name = Some(name);
        }
        if let Some(delta) = arguments_delta {
            self.args_json.push_str(&delta);
        }
        if let Some(response_id) = response_id
            && !response_id.is_empty()
        {
            self.response_id = Some(response_id);
        }
    }
}

/// Parse accumulated argument text, degrading to an empty object (with a
/// warning) when the stream did not deliver valid JSON.
pub(crate) fn parse_args_best_effort(call_id: &str, args_json: &str) -> Value {
    let trimmed = args_json.trim();
    if trimmed.is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(call_id, %error, "tool arguments are not valid JSON, using {{}}");
            Value::Object(serde_json::Map::new())
        }
    }
}
