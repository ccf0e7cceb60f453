//! Custom error types for HIPS processing

use std::fmt;
use std::io;

/// HIPS-specific error types
///
/// Every fatal decode error carries the byte offset at which it was detected.
#[derive(Debug)]
pub enum HipsError {
    /// I/O error
    IoError(io::Error),
    /// Malformed header, geometry, parameter declaration or payload layout
    Format {
        /// Byte offset where the problem was detected
        offset: u64,
        /// Human readable description
        message: String,
    },
    /// The stream ended before an expected field, block or chunk
    Truncated {
        /// Byte offset where more data was expected
        offset: u64,
        /// What was being read
        message: String,
    },
    /// Pixel format code not present in the format table
    UnsupportedPixelFormat {
        /// Byte offset of the format code (or payload start)
        offset: u64,
        /// The offending format code
        code: i64,
    },
    /// A band chunk could not be decompressed into the expected plane
    Decompression {
        /// Byte offset of the chunk payload
        offset: u64,
        /// Band index of the chunk
        band: usize,
        /// Codec specific description
        message: String,
    },
    /// Generic error with message
    GenericError(String),
}

impl HipsError {
    /// Shorthand for a format error at `offset`
    pub fn format(offset: u64, message: impl Into<String>) -> Self {
        HipsError::Format { offset, message: message.into() }
    }

    /// Shorthand for a truncation error at `offset`
    pub fn truncated(offset: u64, message: impl Into<String>) -> Self {
        HipsError::Truncated { offset, message: message.into() }
    }

    /// Byte offset carried by the error, if any
    pub fn offset(&self) -> Option<u64> {
        match self {
            HipsError::Format { offset, .. }
            | HipsError::Truncated { offset, .. }
            | HipsError::UnsupportedPixelFormat { offset, .. }
            | HipsError::Decompression { offset, .. } => Some(*offset),
            HipsError::IoError(_) | HipsError::GenericError(_) => None,
        }
    }

    /// Converts an I/O error raised while reading at `offset`
    ///
    /// Unexpected EOF becomes a truncation error, anything else stays an I/O error.
    pub fn from_read(error: io::Error, offset: u64, what: &str) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            HipsError::truncated(offset, format!("unexpected end of stream while reading {}", what))
        } else {
            HipsError::IoError(error)
        }
    }
}

impl fmt::Display for HipsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HipsError::IoError(e) => write!(f, "I/O error: {}", e),
            HipsError::Format { offset, message } => {
                write!(f, "Format error at byte {}: {}", offset, message)
            }
            HipsError::Truncated { offset, message } => {
                write!(f, "Truncated file at byte {}: {}", offset, message)
            }
            HipsError::UnsupportedPixelFormat { offset, code } => {
                write!(f, "Unsupported pixel format code {} at byte {}", code, offset)
            }
            HipsError::Decompression { offset, band, message } => {
                write!(f, "Failed to decompress band {} at byte {}: {}", band, offset, message)
            }
            HipsError::GenericError(msg) => write!(f, "HIPS error: {}", msg),
        }
    }
}

impl std::error::Error for HipsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HipsError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for HipsError {
    fn from(error: io::Error) -> Self {
        HipsError::IoError(error)
    }
}

impl From<String> for HipsError {
    fn from(msg: String) -> Self {
        HipsError::GenericError(msg)
    }
}

/// Result type for HIPS operations
pub type HipsResult<T> = Result<T, HipsError>;

/// Recoverable metadata problem
///
/// Raised when an optional parameter (the band quantification XML) cannot be
/// interpreted. Decoding continues as if the parameter were absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataWarning {
    /// Name of the extended parameter the warning refers to
    pub parameter: String,
    /// Description of the problem
    pub message: String,
}

impl MetadataWarning {
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        MetadataWarning {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MetadataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metadata warning ({}): {}", self.parameter, self.message)
    }
}
