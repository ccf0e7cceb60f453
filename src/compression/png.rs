//! Handler for PNG compressed band chunks

use image::codecs::png::PngEncoder;
use image::ImageFormat;

use crate::compression::handler::{ChunkContext, CompressionHandler};
use crate::compression::mode::CompressionMode;
use crate::compression::raster::{decode_gray, plane_to_gray};
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::types::BandPlane;

/// Lossless 8 or 16 bit grayscale PNG
pub struct PngHandler;

impl CompressionHandler for PngHandler {
    fn decompress(&self, data: &[u8], context: &ChunkContext) -> HipsResult<BandPlane> {
        decode_gray(data, ImageFormat::Png, context)
    }

    fn compress(&self, plane: &BandPlane) -> HipsResult<Vec<u8>> {
        let image = plane_to_gray(plane, self.name())?;
        let mut out = Vec::new();
        image.write_with_encoder(PngEncoder::new(&mut out))
            .map_err(|e| HipsError::GenericError(format!("PNG encoding failed: {}", e)))?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PNG"
    }

    fn mode(&self) -> CompressionMode {
        CompressionMode::Png
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn context() -> ChunkContext {
        ChunkContext { band: 3, offset: 100, height: 2, width: 3, quantized: true, declared_type: None }
    }

    #[test]
    fn test_round_trip_16_bit() {
        let plane = BandPlane::U16(array![[0, 1, 2], [1000, 40000, 65535]]);
        let chunk = PngHandler.compress(&plane).unwrap();
        std::assert_eq!(CompressionMode::sniff(&chunk), CompressionMode::Png);
        std::assert_eq!(PngHandler.decompress(&chunk, &context()).unwrap(), plane);
    }

    #[test]
    fn test_wrong_geometry_is_rejected() {
        let chunk = PngHandler.compress(&BandPlane::U8(array![[1, 2], [3, 4]])).unwrap();
        let err = PngHandler.decompress(&chunk, &context()).unwrap_err();
        std::assert!(matches!(err, HipsError::Decompression { band: 3, offset: 100, .. }));
    }

    #[test]
    fn test_float_planes_are_not_encodable() {
        std::assert!(PngHandler.compress(&BandPlane::F32(array![[1.0]])).is_err());
    }
}
