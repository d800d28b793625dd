use thiserror::Error;

/// Errors produced while opening or decoding a format.
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O error while reading the payload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload does not start with the expected identifier
    #[error("invalid identifier: expected {expected}, found {found}")]
    InvalidIdentifier { expected: String, found: String },

    /// The payload is too short to contain the structure being read
    #[error("data too small: need at least {expected} bytes, have {actual}")]
    TooSmall { expected: u64, actual: u64 },

    /// Structurally invalid data (bad offsets, impossible sizes, ...)
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// Recognized but not decodable by this build
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A companion file the format depends on could not be resolved
    #[error("missing companion file: {0}")]
    MissingSibling(String),
}

impl FormatError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn invalid_identifier(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
