use ndarray::array;

use super::test_utils::{zlib, HipsFileBuilder};
use crate::compression::{CompressionFactory, CompressionMode};
use crate::hips::errors::HipsError;
use crate::hips::reader::HipsReader;
use crate::hips::types::{BandPlane, PixelBuffer};

fn png_bytes(plane: BandPlane) -> Vec<u8> {
    CompressionFactory::create_handler(CompressionMode::Png).unwrap().compress(&plane).unwrap()
}

#[test]
fn test_raw_u8_with_padded_rows() {
    let mut cursor = HipsFileBuilder::new(2, 3, 1, 0)
        .payload(&[0, 1, 2, 99, 3, 4, 5, 99])
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert_eq!(image.pixels, PixelBuffer::U8(array![[[0, 1, 2], [3, 4, 5]]]));
    std::assert_eq!(image.band_modes, vec![CompressionMode::Raw]);
    std::assert!(image.quantification.is_empty());
    std::assert!(image.warnings.is_empty());
}

#[test]
fn test_raw_u16_little_endian() {
    let mut cursor = HipsFileBuilder::new(1, 2, 2, 1)
        .payload(&[1, 0, 0, 1, 0xFF, 0xFF, 2, 0])
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();
    std::assert_eq!(image.pixels, PixelBuffer::U16(array![[[1, 256]], [[65535, 2]]]));
}

#[test]
fn test_raw_frames_count_as_bands() {
    let mut cursor = HipsFileBuilder::new(1, 1, 1, 0)
        .frames(3)
        .payload(&[7, 8, 9])
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();
    std::assert_eq!(image.band_count(), 3);
    std::assert_eq!(image.pixels.to_f32(), array![[[7.0]], [[8.0]], [[9.0]]]);
}

#[test]
fn test_raw_f64() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&(-1.25f64).to_le_bytes());
    payload.extend_from_slice(&3.5f64.to_le_bytes());
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 6).payload(&payload).cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();
    std::assert_eq!(image.pixels, PixelBuffer::F64(array![[[-1.25, 3.5]]]));
}

#[test]
fn test_stride_smaller_than_row_is_format_error() {
    // 2 rows of 3 u16 pixels need 12 bytes; 8 gives a 4 byte stride
    let mut cursor = HipsFileBuilder::new(2, 3, 1, 1).payload(&[0; 8]).cursor();
    let err = HipsReader::new().read(&mut cursor).unwrap_err();
    std::assert!(matches!(err, HipsError::Format { .. }), "{}", err);
}

#[test]
fn test_payload_not_divisible_by_bands_is_format_error() {
    let mut cursor = HipsFileBuilder::new(1, 1, 2, 0).payload(&[1, 2, 3]).cursor();
    let err = HipsReader::new().read(&mut cursor).unwrap_err();
    std::assert!(matches!(err, HipsError::Format { .. }), "{}", err);
}

#[test]
fn test_empty_raw_payload_is_format_error() {
    let mut cursor = HipsFileBuilder::new(1, 1, 1, 0).cursor();
    std::assert!(HipsReader::new().read(&mut cursor).is_err());
}

#[test]
fn test_unsupported_format_code() {
    let builder = HipsFileBuilder::new(1, 1, 1, 4).payload(&[0; 4]);
    let payload_offset = (builder.build().len() - 4) as u64;
    let err = HipsReader::new().read(&mut builder.cursor()).unwrap_err();
    std::assert!(matches!(err, HipsError::UnsupportedPixelFormat { code: 4, offset } if offset == payload_offset));
}

#[test]
fn test_quantized_deflate_chunk() {
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .chunk(&zlib(&[128, 0]))
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[128.0, 0.0]]]));
    std::assert_eq!(image.band_modes, vec![CompressionMode::Deflate]);
    std::assert_eq!(image.quantification.len(), 1);
}

#[test]
fn test_sixteen_bit_deflate_chunk_is_scaled() {
    // 65535 codes over [0, 2]: code 65535 maps to 2.0
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 1)
        .quantification(&[(0.0, 2.0, 16)])
        .chunk(&zlib(&[0xFF, 0xFF, 0, 0]))
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();
    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[2.0, 0.0]]]));
}

#[test]
fn test_png_chunk() {
    let plane = BandPlane::U8(array![[0, 10], [20, 255]]);
    let mut cursor = HipsFileBuilder::new(2, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .chunk(&png_bytes(plane))
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[0.0, 10.0], [20.0, 255.0]]]));
    std::assert_eq!(image.band_modes, vec![CompressionMode::Png]);
}

#[test]
fn test_mixed_codecs_are_sniffed_per_chunk() {
    let mut cursor = HipsFileBuilder::new(1, 2, 2, 0)
        .quantification(&[(0.0, 255.0, 8), (10.0, 265.0, 8)])
        .chunk(&zlib(&[1, 2]))
        .chunk(&png_bytes(BandPlane::U8(array![[3, 4]])))
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert_eq!(image.band_modes, vec![CompressionMode::Deflate, CompressionMode::Png]);
    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[1.0, 2.0]], [[13.0, 14.0]]]));
}

#[test]
fn test_malformed_quantification_falls_back_to_raw() {
    let mut builder = HipsFileBuilder::new(1, 2, 1, 0);
    let xml = b"<ArrayOfQuantificationParameters><Quantif";
    let offset = builder.push_binary(xml);
    let mut cursor = builder
        .param(&format!("BandQuantification c {} {}", xml.len(), offset))
        .payload(&[5, 6])
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert_eq!(image.pixels, PixelBuffer::U8(array![[[5, 6]]]));
    std::assert_eq!(image.warnings.len(), 1);
    std::assert_eq!(image.warnings[0].parameter, "BandQuantification");
    std::assert!(image.quantification.is_empty());
}

#[test]
fn test_quantification_with_interleaved_elements_stays_chunked() {
    let mut builder = HipsFileBuilder::new(1, 2, 2, 0);
    let xml = concat!(
        "<ArrayOfQuantificationParameters>",
        "<QuantificationParameters Q_Min=\"0\" Q_Max=\"255\" Q=\"8\" />",
        "<Note />",
        "<QuantificationParameters Q_Min=\"0\" Q_Max=\"255\" Q=\"8\" />",
        "</ArrayOfQuantificationParameters>",
    ).as_bytes();
    let offset = builder.push_binary(xml);
    let mut cursor = builder
        .param(&format!("BandQuantification c {} {}", xml.len(), offset))
        .chunk(&zlib(&[128, 0]))
        .chunk(&zlib(&[1, 2]))
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();

    std::assert!(image.warnings.is_empty(), "{:?}", image.warnings);
    std::assert_eq!(image.quantification.len(), 2);
    std::assert_eq!(image.band_modes, vec![CompressionMode::Deflate; 2]);
    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[128.0, 0.0]], [[1.0, 2.0]]]));
}

#[test]
fn test_chunk_longer_than_stream_is_truncated() {
    let mut bytes = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .build();
    bytes.extend_from_slice(&100i32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
    let chunk_offset = (bytes.len() - 5) as u64;

    let err = HipsReader::new().read(&mut std::io::Cursor::new(bytes)).unwrap_err();
    std::assert!(matches!(err, HipsError::Truncated { offset, .. } if offset == chunk_offset), "{}", err);
}

#[test]
fn test_missing_chunk_is_truncated() {
    let mut cursor = HipsFileBuilder::new(1, 2, 2, 0)
        .quantification(&[(0.0, 255.0, 8), (0.0, 255.0, 8)])
        .chunk(&zlib(&[1, 2]))
        .cursor();
    let err = HipsReader::new().read(&mut cursor).unwrap_err();
    std::assert!(matches!(err, HipsError::Truncated { .. }), "{}", err);
}

#[test]
fn test_negative_chunk_length_is_truncated() {
    let mut bytes = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .build();
    bytes.extend_from_slice(&(-5i32).to_le_bytes());
    bytes.extend_from_slice(&[0; 8]);
    let err = HipsReader::new().read(&mut std::io::Cursor::new(bytes)).unwrap_err();
    std::assert!(matches!(err, HipsError::Truncated { .. }), "{}", err);
}

#[test]
fn test_corrupt_deflate_chunk() {
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .chunk(&[1, 2, 3, 4, 5, 6])
        .cursor();
    let err = HipsReader::new().read(&mut cursor).unwrap_err();
    std::assert!(matches!(err, HipsError::Decompression { band: 0, .. }), "{}", err);
}

#[test]
fn test_chunk_with_wrong_dimensions() {
    // Three samples cannot form a 1x2 plane of any width
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .chunk(&zlib(&[1, 2, 3]))
        .cursor();
    let err = HipsReader::new().read(&mut cursor).unwrap_err();
    std::assert!(matches!(err, HipsError::Decompression { .. }), "{}", err);
}

#[test]
fn test_trailing_bytes_after_chunks_are_ignored() {
    let mut cursor = HipsFileBuilder::new(1, 2, 1, 0)
        .quantification(&[(0.0, 255.0, 8)])
        .chunk(&zlib(&[9, 10]))
        .payload(&[0xEE; 3])
        .cursor();
    let image = HipsReader::new().read(&mut cursor).unwrap();
    std::assert_eq!(image.pixels, PixelBuffer::F32(array![[[9.0, 10.0]]]));
}
