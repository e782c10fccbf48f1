//! Error types and handling infrastructure for blinkboard.
//!
//! Library code returns [`BlinkError`] through the crate [`Result`] alias. The binary wraps
//! these in `anyhow` for startup reporting.
//!
//! Only layout construction failures are fatal for the scanning core. Injection failures are
//! carried back to the event loop, logged, and scanning continues.

use thiserror::Error;

/// The main error type for blinkboard operations.
#[derive(Error, Debug)]
pub enum BlinkError {
    /// A layout must contain at least one row
    #[error("Layout has no rows")]
    EmptyLayout,

    /// Every row must contain at least one item
    #[error("Layout row {row} is empty")]
    EmptyRow { row: usize },

    /// A layout token could not be turned into an item
    #[error("Invalid layout item: {token:?}")]
    InvalidItem { token: String },

    /// The keystroke injector reported a failure
    #[error("Keystroke injection failed: {message}")]
    Injection { message: String },

    /// Reading the blink-code byte stream failed
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Standard Result type for blinkboard operations.
pub type Result<T> = std::result::Result<T, BlinkError>;

impl BlinkError {
    /// Create an Io error with additional context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an Injection error with a descriptive message
    pub fn injection(message: impl Into<String>) -> Self {
        Self::Injection {
            message: message.into(),
        }
    }

    /// Create a Config error with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for BlinkError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::Io {
                message: "Device not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::Io {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::Io {
                message: "I/O operation failed".to_string(),
                source: err,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(BlinkError::EmptyLayout.to_string(), "Layout has no rows");
        assert_eq!(
            BlinkError::EmptyRow { row: 2 }.to_string(),
            "Layout row 2 is empty"
        );
        assert_eq!(
            BlinkError::InvalidItem {
                token: "Tab".to_string()
            }
            .to_string(),
            "Invalid layout item: \"Tab\""
        );
        assert_eq!(
            BlinkError::injection("xdotool exited with 1").to_string(),
            "Keystroke injection failed: xdotool exited with 1"
        );
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            BlinkError::config("bad protocol"),
            BlinkError::Config { .. }
        ));
        assert!(matches!(
            BlinkError::injection("no display"),
            BlinkError::Injection { .. }
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BlinkError = io_err.into();

        match err {
            BlinkError::Io { message, .. } => assert_eq!(message, "Permission denied"),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_missing_device_conversion() {
        let err: BlinkError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(err.to_string(), "I/O operation failed: Device not found");
    }
}
