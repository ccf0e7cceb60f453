//! Factory for creating compression handlers

use crate::hips::errors::{HipsError, HipsResult};
use super::deflate::DeflateHandler;
use super::handler::CompressionHandler;
use super::jpeg::JpegHandler;
use super::mode::CompressionMode;
use super::png::PngHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a handler for a chunked compression mode
    pub fn create_handler(mode: CompressionMode) -> HipsResult<Box<dyn CompressionHandler>> {
        match mode {
            CompressionMode::Deflate => Ok(Box::new(DeflateHandler::new())),
            CompressionMode::Png => Ok(Box::new(PngHandler)),
            CompressionMode::Jpeg => Ok(Box::new(JpegHandler::new())),
            CompressionMode::Raw => Err(HipsError::GenericError(
                "Raw payloads are not chunk compressed".to_string(),
            )),
        }
    }

    /// Create the handler for a chunk by sniffing its leading bytes
    pub fn detect(data: &[u8]) -> HipsResult<Box<dyn CompressionHandler>> {
        Self::create_handler(CompressionMode::sniff(data))
    }
}
