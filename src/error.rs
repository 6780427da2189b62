//! Central error types for MobileWebcam.
//!
//! Every fallible operation in the crate returns `WebcamResult`. Failures are
//! logged at the component boundary and then handed back to the caller, so a
//! missing configuration file can be told apart from a corrupt one.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for MobileWebcam operations.
#[derive(Error, Debug)]
pub enum WebcamError {
    /// The configuration file does not exist yet
    #[error("Configuration file not found at {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but could not be read
    #[error("Failed to read configuration file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be written
    #[error("Failed to write configuration file {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not a valid settings tree
    #[error("Failed to parse settings JSON: {0}")]
    ConfigParse(#[source] serde_json::Error),

    /// The settings tree could not be turned into JSON
    #[error("Failed to serialize settings JSON: {0}")]
    ConfigSerialize(#[source] serde_json::Error),

    /// Storage operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Storage backend is declared but has no implementation
    #[error("Storage type not supported yet: {0}")]
    UnsupportedStorage(String),

    /// Timestamp format string contains an unknown specifier
    #[error("Invalid timestamp format string: {0:?}")]
    InvalidTimestampFormat(String),

    /// Captured frame is empty or its buffer does not match its size
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Picture file could not be opened or decoded
    #[error("Image error: {0}")]
    ImageError(String),

    /// Image encoding failed
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl WebcamError {
    /// True when the configuration file is simply absent, meaning defaults apply.
    pub fn is_config_missing(&self) -> bool {
        matches!(self, WebcamError::ConfigNotFound { .. })
    }
}

impl From<image::ImageError> for WebcamError {
    fn from(err: image::ImageError) -> Self {
        WebcamError::ImageError(err.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to WebcamError::Other.
    fn context(self, msg: &str) -> WebcamResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> WebcamResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> WebcamResult<T> {
        self.map_err(|e| WebcamError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> WebcamResult<T> {
        self.map_err(|e| WebcamError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to WebcamError::Other with the given message.
    fn context(self, msg: &str) -> WebcamResult<T>;

    /// Convert None to WebcamError::Other with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> WebcamResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> WebcamResult<T> {
        self.ok_or_else(|| WebcamError::Other(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> WebcamResult<T> {
        self.ok_or_else(|| WebcamError::Other(f()))
    }
}

/// Type alias for Results using WebcamError.
pub type WebcamResult<T> = Result<T, WebcamError>;
