//! Crate-level error type.
//!
//! The `Display` text of the request-path variants is exactly what the user
//! sees in the alert raised after a failed submission, so it carries no
//! prefixes.

use thiserror::Error;

/// Generic message used when the server's error body has no `error` field.
pub const SERVER_FALLBACK_MESSAGE: &str = "An error occurred";

/// Message used when a failure carries no message of its own.
pub const ALERT_FALLBACK_MESSAGE: &str = "An error occurred during analysis";

#[derive(Debug, Error)]
pub enum CompareError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-2xx status and a structured error body.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A response body was not the JSON we expected.
    #[error("{0}")]
    Decode(String),

    /// Local file system failure (reading a PDF, writing a report).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CompareError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CompareError::Io {
            context: context.into(),
            source,
        }
    }

    /// The text shown in the blocking alert for this failure.
    pub fn alert_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            ALERT_FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for CompareError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CompareError::Decode(e.to_string())
        } else {
            CompareError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for CompareError {
    fn from(e: serde_json::Error) -> Self {
        CompareError::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for CompareError {
    fn from(e: toml::de::Error) -> Self {
        CompareError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_bare_message() {
        let e = CompareError::Server {
            status: 500,
            message: "bad pdf".to_string(),
        };
        assert_eq!(e.to_string(), "bad pdf");
        assert_eq!(e.alert_message(), "bad pdf");
    }

    #[test]
    fn test_empty_message_falls_back() {
        let e = CompareError::Transport(String::new());
        assert_eq!(e.alert_message(), ALERT_FALLBACK_MESSAGE);
        let e = CompareError::Server {
            status: 502,
            message: "   ".to_string(),
        };
        assert_eq!(e.alert_message(), ALERT_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let e: CompareError = err.into();
        assert!(matches!(e, CompareError::Decode(_)));
        assert!(!e.alert_message().is_empty());
    }

    #[test]
    fn test_io_error_includes_context() {
        let e = CompareError::io(
            "reading a.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(e.to_string(), "reading a.pdf: no such file");
    }

    #[test]
    fn test_config_error_prefix() {
        let e = CompareError::Config("weight_text must be within [0, 1]".to_string());
        assert!(e.to_string().starts_with("invalid configuration:"));
    }
}
