//! Compression handler trait definition

use crate::compression::mode::CompressionMode;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::pixel_format::SampleType;
use crate::hips::types::BandPlane;

/// Where a chunk sits and what it must decode to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkContext {
    /// Band index of the chunk
    pub band: usize,
    /// Byte offset of the chunk payload in the file
    pub offset: u64,
    pub height: usize,
    pub width: usize,
    /// Whether the band has quantification parameters
    pub quantized: bool,
    /// Sample type of the header format code, if it is a known one
    pub declared_type: Option<SampleType>,
}

impl ChunkContext {
    /// Decompression error for this chunk
    pub fn error(&self, message: impl Into<String>) -> HipsError {
        HipsError::Decompression {
            offset: self.offset,
            band: self.band,
            message: message.into(),
        }
    }

    /// Number of pixels in one band
    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    /// Fails unless a decoded image has exactly the band geometry
    pub fn check_dimensions(&self, height: usize, width: usize) -> HipsResult<()> {
        if height != self.height || width != self.width {
            return Err(self.error(format!(
                "decoded {}x{} pixels, expected {}x{}", width, height, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Strategy trait for the per-band chunk codecs
pub trait CompressionHandler: Send + Sync {
    /// Decompress one chunk into a band plane of the context's geometry
    fn decompress(&self, data: &[u8], context: &ChunkContext) -> HipsResult<BandPlane>;

    /// Compress one band plane into a chunk
    fn compress(&self, plane: &BandPlane) -> HipsResult<Vec<u8>>;

    /// Get the name of this compression method
    fn name(&self) -> &'static str;

    /// Get the compression mode
    fn mode(&self) -> CompressionMode;
}
