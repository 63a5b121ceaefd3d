//! Error types for playtest orchestration

use thiserror::Error;

/// Result type for orchestrator operations
pub type PlaytestResult<T> = std::result::Result<T, PlaytestError>;

/// Errors surfaced to callers of the orchestrator.
///
/// Per-tester failures never show up here; they are captured inside the
/// corresponding [`TestResult`](crate::types::TestResult).
#[derive(Debug, Error)]
pub enum PlaytestError {
    /// A swarm run was requested with an empty roster
    #[error("No testers registered: register at least one tester before running a playtest")]
    NoTestersRegistered,

    /// Configuration values are out of range or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {reason}")]
    ConfigLoad {
        path: String,
        reason: String,
    },

    /// Other errors
    #[error("Playtest error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Errors raised by a [`ModelClient`](crate::client::ModelClient).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The model provider rejected or failed the request
    #[error("{0}")]
    Api(String),

    /// Network or transport failure talking to the provider
    #[error("transport error: {0}")]
    Transport(String),

    /// The call exceeded the per-request deadline
    #[error("request timeout after {timeout_ms}ms")]
    Timeout {
        timeout_ms: u64,
    },

    /// The client is not usable (missing credentials, unknown tier, ...)
    #[error("model client unavailable: {0}")]
    Unavailable(String),
}

impl ModelError {
    /// Convenience constructor for provider-side failures
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }

    /// Whether this error represents a deadline expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_testers_message() {
        let err = PlaytestError::NoTestersRegistered;
        assert!(err.to_string().contains("No testers registered"));
    }

    #[test]
    fn test_model_error_messages() {
        assert_eq!(ModelError::api("AI API Error").to_string(), "AI API Error");

        let timeout = ModelError::Timeout { timeout_ms: 1 };
        assert!(timeout.to_string().contains("timeout"));
        assert!(timeout.is_timeout());
        assert!(!ModelError::Transport("reset".into()).is_timeout());
    }
}
