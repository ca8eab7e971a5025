//! Logger and sink error types

use thiserror::Error;

/// Errors raised by a logger during its session
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Parameters were missing or the destination could not be resolved.
    /// Fatal to the session: nothing is recorded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Sink failed: {0}")]
    Sink(#[from] SinkError),
}

impl LoggerError {
    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::Configuration(_))
    }
}

/// Errors that can occur while delivering a transcript
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Webhook error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message() {
        let err = LoggerError::Configuration("Parameter was not specified.".to_string());
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Configuration error: Parameter was not specified.");
    }

    #[test]
    fn test_sink_error_converts() {
        let err: LoggerError = SinkError::Api {
            status: 404,
            message: "no such hook".to_string(),
        }
        .into();

        assert!(!err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("no such hook"));
    }
}
