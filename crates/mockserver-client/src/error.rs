//! Error types returned by the MockServer client.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to a MockServer instance.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Caller input rejected before any network call was made.
    #[error("invalid argument: {0}")]
    Argument(String),
    /// The server answered a control operation in an unexpected way.
    #[error("{message}")]
    Protocol {
        status: Option<u16>,
        message: String,
    },
    /// A verification failed. The message is the server's diagnostic, verbatim.
    #[error("{0}")]
    Assertion(String),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read expectation file {}: {source}", path.display())]
    ExpectationFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to start blocking runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl ClientError {
    pub(crate) fn protocol(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Protocol {
            status,
            message: message.into(),
        }
    }

    /// True when this error reports a failed verification rather than an
    /// infrastructure fault.
    pub fn is_assertion(&self) -> bool {
        matches!(self, ClientError::Assertion(_))
    }

    /// HTTP status code attached to a protocol error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => *status,
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_is_verbatim() {
        let err = ClientError::Assertion("Request not found exactly 2 times".to_string());
        assert!(err.is_assertion());
        assert_eq!(err.to_string(), "Request not found exactly 2 times");
    }

    #[test]
    fn test_protocol_status() {
        let err = ClientError::protocol(Some(400), "incorrect request format");
        assert!(!err.is_assertion());
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "incorrect request format");
    }

    #[test]
    fn test_expectation_file_message_names_path() {
        let err = ClientError::ExpectationFile {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.json"));
    }
}
