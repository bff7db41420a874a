//! Error types for the posit8 core library.

/// Errors raised while parsing posit8 inputs or running operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A bit string could not be interpreted as an 8-bit pattern.
    #[error("Invalid bit string '{input}': {message}")]
    InvalidBitString {
        /// The offending input
        input: String,
        /// What went wrong
        message: String,
    },

    /// A numeric operand could not be parsed.
    #[error("Invalid operand '{input}'")]
    InvalidOperand {
        /// The offending input
        input: String,
    },

    /// Matrix shapes do not line up.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Required size
        expected: usize,
        /// Size that was supplied
        actual: usize,
    },

    /// A matrix side whose element count does not fit in memory.
    #[error("Matrix side {n} exceeds the limit of {max}")]
    MatrixTooLarge {
        /// Requested side length
        n: usize,
        /// Largest supported side length
        max: usize,
    },

    /// A device mode code outside the protocol.
    #[error("Unsupported device mode: {0}")]
    UnsupportedMode(i32),

    /// An operation name that is not recognised.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A conversion operation was used where arithmetic is required.
    #[error("Operation '{0}' is not an arithmetic operation")]
    NotArithmetic(&'static str),
}

/// Convenience `Result` type alias for posit8 operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new bit-string error.
    pub fn invalid_bits<I, M>(input: I, message: M) -> Self
    where
        I: Into<String>,
        M: Into<String>,
    {
        Error::InvalidBitString {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a new operand error.
    pub fn invalid_operand<S: Into<String>>(input: S) -> Self {
        Error::InvalidOperand {
            input: input.into(),
        }
    }
}
