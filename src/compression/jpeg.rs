//! Handler for JPEG compressed band chunks

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::compression::handler::{ChunkContext, CompressionHandler};
use crate::compression::mode::CompressionMode;
use crate::compression::raster::{decode_gray, plane_to_gray};
use crate::hips::constants::codec_defaults::JPEG_QUALITY;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::types::BandPlane;

/// Lossy 8 bit grayscale JPEG
pub struct JpegHandler {
    quality: u8,
}

impl JpegHandler {
    pub fn new() -> Self {
        JpegHandler { quality: JPEG_QUALITY }
    }
}

impl Default for JpegHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for JpegHandler {
    fn decompress(&self, data: &[u8], context: &ChunkContext) -> HipsResult<BandPlane> {
        decode_gray(data, ImageFormat::Jpeg, context)
    }

    fn compress(&self, plane: &BandPlane) -> HipsResult<Vec<u8>> {
        if !matches!(plane, BandPlane::U8(_)) {
            return Err(HipsError::GenericError(format!(
                "JPEG chunks need 8 bit samples, got {}", plane.sample_type()
            )));
        }
        let image = plane_to_gray(plane, self.name())?;
        let mut out = Vec::new();
        image.write_with_encoder(JpegEncoder::new_with_quality(&mut out, self.quality))
            .map_err(|e| HipsError::GenericError(format!("JPEG encoding failed: {}", e)))?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "JPEG"
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Jpeg
    }
}
