//! Error handling for RelayKit
//!
//! Connection handling is the only fallible subsystem in this application,
//! so the taxonomy is small: a `ConnectionError` enum nested inside the
//! unified [`Error`] type used by public APIs.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors related to the serial link: opening a port, writing to
/// it, and state machine violations.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// A connection is already open
    #[error("Already connected to {port}")]
    AlreadyConnected {
        /// The port the current connection uses.
        port: String,
    },

    /// No connection is open
    #[error("Not connected")]
    NotConnected,

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Main error type for RelayKit
///
/// A unified error type used in public APIs across the workspace.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_are_transparent() {
        let err: Error = ConnectionError::NotConnected.into();
        assert_eq!(err.to_string(), "Not connected");
        assert!(err.is_connection_error());
    }

    #[test]
    fn open_failure_names_the_port() {
        let err: Error = ConnectionError::FailedToOpen {
            port: "/dev/ttyUSB0".to_string(),
            reason: "Permission denied".to_string(),
        }
        .into();
        let text = err.to_string();
        assert!(text.contains("/dev/ttyUSB0"));
        assert!(text.contains("Permission denied"));
    }
}
