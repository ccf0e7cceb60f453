//! Handler for deflate compressed band chunks

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;

use crate::compression::handler::{ChunkContext, CompressionHandler};
use crate::compression::mode::CompressionMode;
use crate::hips::constants::codec_defaults::DEFLATE_LEVEL;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::pixel_format::SampleType;
use crate::hips::types::BandPlane;

/// zlib stream of little-endian samples
pub struct DeflateHandler {
    level: u32,
}

impl DeflateHandler {
    pub fn new() -> Self {
        DeflateHandler { level: DEFLATE_LEVEL }
    }
}

impl Default for DeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Element type of a decompressed band from its size per pixel
///
/// Quantized bands hold unsigned integers. Other bands use the declared
/// format's type when its size matches, else the usual type of that size.
fn infer_sample_type(bytes_per_pixel: usize, context: &ChunkContext) -> Option<SampleType> {
    if context.quantized {
        return match bytes_per_pixel {
            1 => Some(SampleType::U8),
            2 => Some(SampleType::U16),
            4 => Some(SampleType::U32),
            _ => None,
        };
    }
    if let Some(declared) = context.declared_type.filter(|t| t.size() == bytes_per_pixel) {
        return Some(declared);
    }
    match bytes_per_pixel {
        1 => Some(SampleType::U8),
        2 => Some(SampleType::U16),
        4 => Some(SampleType::F32),
        8 => Some(SampleType::F64),
        _ => None,
    }
}

impl CompressionHandler for DeflateHandler {
    fn decompress(&self, data: &[u8], context: &ChunkContext) -> HipsResult<BandPlane> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)
            .map_err(|e| context.error(format!("invalid deflate stream: {}", e)))?;

        let pixels = context.pixel_count();
        if pixels == 0 || decompressed.len() % pixels != 0 {
            return Err(context.error(format!(
                "{} decompressed bytes do not fill {} pixels", decompressed.len(), pixels
            )));
        }
        let bytes_per_pixel = decompressed.len() / pixels;
        let sample_type = infer_sample_type(bytes_per_pixel, context)
            .ok_or_else(|| context.error(format!("unsupported sample size of {} bytes", bytes_per_pixel)))?;
        debug!("Band {}: deflate chunk of {} bytes holds {} samples", context.band, data.len(), sample_type);

        BandPlane::from_le_bytes(sample_type, context.height, context.width, &decompressed)
            .ok_or_else(|| context.error("decompressed size does not match band geometry"))
    }

    fn compress(&self, plane: &BandPlane) -> HipsResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(&plane.to_le_bytes()).map_err(HipsError::IoError)?;
        encoder.finish().map_err(HipsError::IoError)
    }

    fn name(&self) -> &'static str {
        "Deflate"
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Deflate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn context(quantized: bool, declared_type: Option<SampleType>) -> ChunkContext {
        ChunkContext { band: 0, offset: 0, height: 2, width: 2, quantized, declared_type }
    }

    #[test]
    fn test_round_trip_keeps_type() {
        let handler = DeflateHandler::new();
        let plane = BandPlane::U16(array![[1, 2], [300, 65535]]);
        let chunk = handler.compress(&plane).unwrap();
        let decoded = handler.decompress(&chunk, &context(true, None)).unwrap();
        std::assert_eq!(decoded, plane);
    }

    #[test]
    fn test_width_inference() {
        std::assert_eq!(infer_sample_type(4, &context(true, None)), Some(SampleType::U32));
        std::assert_eq!(infer_sample_type(4, &context(false, None)), Some(SampleType::F32));
        std::assert_eq!(infer_sample_type(4, &context(false, Some(SampleType::U32))), Some(SampleType::U32));
        std::assert_eq!(infer_sample_type(8, &context(true, None)), None);
        std::assert_eq!(infer_sample_type(3, &context(false, None)), None);
    }

    #[test]
    fn test_corrupt_stream_is_decompression_error() {
        let err = DeflateHandler::new().decompress(&[1, 2, 3, 4], &context(true, None)).unwrap_err();
        std::assert!(matches!(err, HipsError::Decompression { band: 0, .. }));
    }

    #[test]
    fn test_size_mismatch_is_decompression_error() {
        let handler = DeflateHandler::new();
        let chunk = handler.compress(&BandPlane::U8(array![[1, 2, 3]])).unwrap();
        std::assert!(handler.decompress(&chunk, &context(true, None)).is_err());
    }
}
