//! Error types for the media bridge

use std::time::Duration;

use thiserror::Error;

/// Failure of a single call across the process boundary
///
/// Domain failures (bad URL, download failed) are not transport errors; the
/// host reports those inside a normally returned `DownloadOutcome`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Host unreachable: {0}")]
    Unreachable(String),

    #[error("Host rejected call ({code}): {message}")]
    Rejected { code: i32, message: String },

    #[error("Unexpected payload shape: {0}")]
    ShapeMismatch(#[from] serde_json::Error),

    #[error("Host did not respond within {0:?}")]
    Timeout(Duration),
}

/// Result type for bridge calls
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Host not found: {0}")]
    HostNotFound(String),
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

// Lets errors cross back over an IPC boundary as plain strings
impl serde::Serialize for TransportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = TransportError::Rejected {
            code: -32601,
            message: "unknown command".to_string(),
        };
        assert_eq!(err.to_string(), "Host rejected call (-32601): unknown command");
    }

    #[test]
    fn test_transport_error_serializes_as_string() {
        let err = TransportError::Unreachable("stdout closed".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!("Host unreachable: stdout closed"));
    }

    #[test]
    fn test_transport_converts_into_crate_error() {
        let err: Error = TransportError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, Error::Transport(TransportError::Timeout(_))));
    }
}
