//! Payload compression modes

use std::fmt;
use std::str::FromStr;

use crate::hips::constants::signatures;
use crate::hips::errors::HipsError;

/// How a file's pixel payload, or one band chunk of it, is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMode {
    /// One contiguous uncompressed block, no chunk framing
    Raw,
    /// zlib stream of little-endian samples
    Deflate,
    /// PNG grayscale image
    Png,
    /// JPEG grayscale image
    Jpeg,
}

impl CompressionMode {
    /// Whether the payload is split into length-prefixed band chunks
    pub fn is_chunked(&self) -> bool {
        !matches!(self, CompressionMode::Raw)
    }

    /// Codec of a chunk, chosen from its leading bytes
    pub fn sniff(chunk: &[u8]) -> Self {
        if chunk.starts_with(&signatures::PNG) {
            CompressionMode::Png
        } else if chunk.starts_with(&signatures::JPEG) {
            CompressionMode::Jpeg
        } else {
            CompressionMode::Deflate
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionMode::Raw => "raw",
            CompressionMode::Deflate => "deflate",
            CompressionMode::Png => "png",
            CompressionMode::Jpeg => "jpeg",
        }
    }

    pub fn all() -> [CompressionMode; 4] {
        [CompressionMode::Raw, CompressionMode::Deflate, CompressionMode::Png, CompressionMode::Jpeg]
    }
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CompressionMode {
    type Err = HipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "none" | "uncompressed" => Ok(CompressionMode::Raw),
            "deflate" | "zlib" | "gz" => Ok(CompressionMode::Deflate),
            "png" => Ok(CompressionMode::Png),
            "jpeg" | "jpg" => Ok(CompressionMode::Jpeg),
            _ => Err(HipsError::GenericError(format!("Unknown compression mode: {}", s))),
        }
    }
}
