//! Error types for the cross-validation harness.

use std::path::PathBuf;

/// Errors that can occur while loading inputs, driving a device or writing
/// reports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error on a known path
    #[error("I/O error on {path}: {source}")]
    IoPath {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// CSV reader or writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// A value table row that is not a number
    #[error("Table line {line}: {message}")]
    Table {
        /// One-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The device could not be run or returned unusable output
    #[error("Device error: {message}")]
    Device {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A device invocation ran past its deadline
    #[error("Device timed out after {millis}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        millis: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Error from the posit8 core library
    #[error("Core error: {0}")]
    Core(#[from] posit8_core::Error),
}

/// Convenience `Result` type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether retrying the same invocation could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Io(_) | Error::IoPath { .. } => true,
            Error::Device { .. } => true,
            Error::Timeout { .. } => true,
            Error::Csv(_) => false,
            Error::Serialization(_) => false,
            Error::TomlParse(_) | Error::TomlWrite(_) => false,
            Error::Table { .. } => false,
            Error::Config { .. } => false,
            Error::Core(_) => false,
        }
    }

    /// Creates a new device error with a message.
    pub fn device<S: Into<String>>(message: S) -> Self {
        Error::Device {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new device error with a message and source error.
    pub fn device_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Device {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it happened on.
    pub fn io_with_path<P: Into<PathBuf>>(source: std::io::Error, path: P) -> Self {
        Error::IoPath {
            path: path.into(),
            source,
        }
    }

    /// Creates a new table error.
    pub fn table<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Table {
            line,
            message: message.into(),
        }
    }
}
