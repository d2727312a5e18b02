//! Error handling for the Meshtastic UI application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for Meshtastic UI operations
#[derive(Error, Debug)]
pub enum MeshUiError {
    /// Errors reported by the device library
    #[error("Device error: {0}")]
    Device(String),

    /// Operation requires a connected device
    #[error("Device not connected")]
    NotConnected,

    /// Errors while sending a text message
    #[error("Send error: {0}")]
    Send(String),

    /// Timeout errors
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MeshUiError>,
    },
}

impl MeshUiError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MeshUiError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a device error from a meshtastic library error
    pub fn from_device_error(err: impl std::fmt::Display) -> Self {
        MeshUiError::Device(err.to_string())
    }
}

/// Result type alias for Meshtastic UI operations
pub type Result<T> = std::result::Result<T, MeshUiError>;

/// Extension trait for adding context to I/O results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MeshUiError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| MeshUiError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeshUiError::Device("port busy".to_string());
        assert_eq!(err.to_string(), "Device error: port busy");
        assert_eq!(MeshUiError::NotConnected.to_string(), "Device not connected");
    }

    #[test]
    fn test_error_with_context() {
        let err = MeshUiError::Timeout("configure".to_string());
        let with_ctx = err.with_context("Failed to open /dev/ttyACM0");
        assert!(with_ctx.to_string().contains("Failed to open /dev/ttyACM0"));
        assert!(with_ctx.to_string().contains("configure"));
    }

    #[test]
    fn test_io_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = result.context("Failed to append").unwrap_err();
        assert!(err.to_string().starts_with("Failed to append"));
    }
}
