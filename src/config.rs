//! Streamer configuration and per-reply context.

use secrecy::SecretString;
use std::time::Duration;

/// Configuration for one [`crate::ReplyStreamer`].
///
/// All knobs are caller-supplied. Zero retries means exactly one attempt;
/// `tool_timeout: None` means tool calls are not raced against a deadline;
/// a zero `retry_delay` means no wait between attempts.
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Maximum number of tool executions in flight at once (clamped to >= 1
    /// by the queue).
    pub max_concurrency: usize,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Deadline for a single tool execution attempt.
    pub tool_timeout: Option<Duration>,
    /// Wait between attempts.
    pub retry_delay: Duration,
    /// Base URL of the upstream responses API, used to submit tool outputs
    /// back after a successful execution.
    pub responses_api_url: Option<String>,
    /// Credential for the responses API. Without it (or without a response
    /// id on the tool call) no tool output is submitted upstream.
    pub api_key: Option<SecretString>,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_retries: 0,
            tool_timeout: None,
            retry_delay: Duration::ZERO,
            responses_api_url: None,
            api_key: None,
        }
    }
}

impl StreamerConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool execution concurrency limit.
    pub const fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Set the number of retries after the first failed attempt.
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-attempt tool timeout.
    pub const fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Set the delay between attempts.
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the responses API base URL.
    pub fn with_responses_api_url(mut self, url: impl Into<String>) -> Self {
        self.responses_api_url = Some(url.into());
        self
    }

    /// Set the responses API credential.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }
}

/// Identifies whose reply is being streamed. Threaded opaquely to the tool
/// executor and the run recorder.
#[derive(Debug, Clone, Default)]
pub struct StreamerContext {
    /// Owning tenant.
    pub tenant_id: String,
    /// Conversation the reply belongs to.
    pub conversation_id: String,
    /// AI configuration that produced the reply.
    pub config_id: String,
    /// Run classification recorded with each tool execution.
    pub run_type: String,
}

impl StreamerContext {
    /// Create a context for a tenant/conversation pair.
    pub fn new(tenant_id: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            conversation_id: conversation_id.into(),
            config_id: String::new(),
            run_type: "tool_call".to_string(),
        }
    }

    /// Set the AI configuration id.
    pub fn with_config_id(mut self, config_id: impl Into<String>) -> Self {
        self.config_id = config_id.into();
        self
    }

    /// Set the run classification.
    pub fn with_run_type(mut self, run_type: impl Into<String>) -> Self {
        self.run_type = run_type.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_all_fields() {
        let config = StreamerConfig::new()
            .with_max_concurrency(2)
            .with_max_retries(3)
            .with_tool_timeout(Duration::from_millis(250))
            .with_retry_delay(Duration::from_millis(10))
            .with_responses_api_url("https://api.example.com/v1/responses")
            .with_api_key("sk-test");

        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.tool_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert!(config.responses_api_url.is_some());
        assert!(config.api_key.is_some());
    }

    #[test]
    fn defaults_mean_one_attempt_and_no_timeout() {
        let config = StreamerConfig::default();
        assert_eq!(config.max_retries, 0);
        assert!(config.tool_timeout.is_none());
        assert_eq!(config.retry_delay, Duration::ZERO);
    }
}
