//! Conversions between band planes and grayscale images

use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Luma};
use log::warn;
use ndarray::Array2;

use crate::compression::handler::ChunkContext;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::types::BandPlane;

/// Decodes an image chunk into a plane
///
/// 8 and 16 bit grayscale images keep their depth. Anything else is
/// reduced to luma with a warning.
pub fn decode_gray(data: &[u8], format: ImageFormat, context: &ChunkContext) -> HipsResult<BandPlane> {
    let decoded = image::load_from_memory_with_format(data, format)
        .map_err(|e| context.error(format!("invalid {:?} image: {}", format, e)))?;
    let (width, height) = decoded.dimensions();
    context.check_dimensions(height as usize, width as usize)?;
    let shape = (context.height, context.width);

    let plane = match decoded {
        DynamicImage::ImageLuma8(gray) => Array2::from_shape_vec(shape, gray.into_raw()).map(BandPlane::U8),
        DynamicImage::ImageLuma16(gray) => Array2::from_shape_vec(shape, gray.into_raw()).map(BandPlane::U16),
        wide @ (DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_) | DynamicImage::ImageLumaA16(_)) => {
            warn!("Band {}: {:?} chunk is not grayscale, using luma", context.band, format);
            Array2::from_shape_vec(shape, wide.to_luma16().into_raw()).map(BandPlane::U16)
        }
        other => {
            warn!("Band {}: {:?} chunk is not grayscale, using luma", context.band, format);
            Array2::from_shape_vec(shape, other.to_luma8().into_raw()).map(BandPlane::U8)
        }
    };
    plane.map_err(|e| context.error(e.to_string()))
}

/// Grayscale image holding an 8 or 16 bit plane
pub fn plane_to_gray(plane: &BandPlane, codec: &str) -> HipsResult<DynamicImage> {
    let width = plane.width() as u32;
    let height = plane.height() as u32;
    let image = match plane {
        BandPlane::U8(a) => ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(width, height, a.iter().copied().collect())
            .map(DynamicImage::ImageLuma8),
        BandPlane::U16(a) => ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, a.iter().copied().collect())
            .map(DynamicImage::ImageLuma16),
        other => {
            return Err(HipsError::GenericError(format!(
                "{} chunks cannot store {} samples", codec, other.sample_type()
            )));
        }
    };
    image.ok_or_else(|| HipsError::GenericError(format!("{}x{} plane does not fit an image buffer", width, height)))
}
