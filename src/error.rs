//! Error types for reply streaming and tool execution.

use thiserror::Error;

/// Crate-wide error type.
///
/// Most recoverable faults (argument parse failures, run-recording failures,
/// tool-output submission failures) are logged and swallowed at their site;
/// the variants here cover the paths that do surface to callers.
#[derive(Debug, Error)]
pub enum ReplyError {
    /// Fatal error reported by the upstream model stream. The whole reply
    /// attempt must be treated as failed.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Tool execution failed at the transport level (as opposed to a tool
    /// returning a handled failure result).
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// HTTP error from a collaborator endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from a collaborator endpoint.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },
}

impl ReplyError {
    /// Create an API error from a status code and message.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
