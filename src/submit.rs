//! Tool-output submission back to the upstream responses API.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::ReplyError;

/// Posts tool outputs to `{responses_api_url}/{response_id}/tool_outputs`.
///
/// The HTTP client and base URL are injected rather than resolved globally,
/// so the endpoint can be pointed at a test server.
#[derive(Debug, Clone)]
pub struct ToolOutputClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl ToolOutputClient {
    /// Create a client for the given responses API base URL.
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Replace the underlying HTTP client (e.g. one with custom timeouts).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Submit one tool call's output for the given upstream response.
    pub async fn submit(
        &self,
        response_id: &str,
        tool_call_id: &str,
        output: &Value,
    ) -> Result<(), ReplyError> {
        let url = format!(
            "{}/{}/tool_outputs",
            self.base_url.trim_end_matches('/'),
            response_id
        );
        let body = serde_json::json!({
            "tool_outputs": [{
                "tool_call_id": tool_call_id,
                "output": output,
            }]
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReplyError::api_error(status.as_u16(), message));
        }
        Ok(())
    }
}
