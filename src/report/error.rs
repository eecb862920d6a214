//! Error types for report transactions.
//!
//! Display output is the user-facing text: it is shown inline in the
//! credential prompt and appended to the message log.

use std::path::PathBuf;

use thiserror::Error;

/// Why a transaction did not end with a saved file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The endpoint answered with a non-success status.
    #[error("{message}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// Server-provided `error` text, or a status-derived fallback.
        message: String,
    },

    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("{message}")]
    Network {
        /// The underlying transport message.
        message: String,
    },

    /// The bytes arrived but could not be saved locally.
    #[error("could not save {filename}: {message}")]
    Save {
        /// The resolved filename that was being saved.
        filename: String,
        /// The underlying save failure.
        message: String,
    },
}

impl TransactionError {
    /// Creates an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a save-action error.
    pub fn save(filename: impl Into<String>, source: &SaveError) -> Self {
        Self::Save {
            filename: filename.into(),
            message: source.to_string(),
        }
    }
}

/// Errors raised while writing fetched bytes to their local destination.
#[derive(Debug, Error)]
pub enum SaveError {
    /// File system error while creating or writing the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The save destination refused the file for a non-IO reason.
    #[error("save rejected: {reason}")]
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

impl SaveError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_server_message_only() {
        let error = TransactionError::http(401, "bad credentials");
        assert_eq!(error.to_string(), "bad credentials");
    }

    #[test]
    fn test_network_error_displays_transport_message() {
        let error = TransactionError::network("connection refused");
        assert_eq!(error.to_string(), "connection refused");
    }

    #[test]
    fn test_save_error_names_the_file() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let save = SaveError::io(PathBuf::from("/tmp/report.csv"), io_error);
        let error = TransactionError::save("report.csv", &save);
        let msg = error.to_string();
        assert!(msg.starts_with("could not save report.csv"), "got: {msg}");
        assert!(msg.contains("/tmp/report.csv"), "Expected path in: {msg}");
    }
}
