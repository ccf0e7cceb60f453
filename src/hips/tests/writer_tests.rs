use std::io::Cursor;

use ndarray::{array, Array3};

use crate::compression::CompressionMode;
use crate::hips::header::HipsHeader;
use crate::hips::image::HipsImage;
use crate::hips::params::{ExtendedParam, ExtendedParams, ParamVector};
use crate::hips::pixel_format::PixelFormat;
use crate::hips::quantification::{QuantParams, QuantTable};
use crate::hips::reader::HipsReader;
use crate::hips::types::PixelBuffer;
use crate::hips::writer::HipsWriter;

fn header_for(pixels: &PixelBuffer, format: PixelFormat) -> HipsHeader {
    HipsHeader::new(pixels.height(), pixels.width(), pixels.bands(), format)
}

fn encode_and_read(
    header: &HipsHeader,
    params: &ExtendedParams,
    quantification: &QuantTable,
    pixels: &PixelBuffer,
    mode: CompressionMode,
) -> HipsImage {
    let bytes = HipsWriter::encode(header, params, quantification, pixels, mode).unwrap();
    HipsReader::new().read(&mut Cursor::new(bytes)).unwrap()
}

fn gradient(bands: usize, height: usize, width: usize) -> Array3<u8> {
    Array3::from_shape_fn((bands, height, width), |(b, y, x)| (b * 40 + y * 8 + x * 4) as u8)
}

#[test]
fn test_raw_round_trip_for_every_format() {
    let cases = [
        (PixelFormat::Byte, PixelBuffer::U8(array![[[1, 2, 3]], [[4, 5, 6]]])),
        (PixelFormat::ByteRgb, PixelBuffer::U8(array![[[9, 8, 7]], [[6, 5, 4]]])),
        (PixelFormat::UInt16, PixelBuffer::U16(array![[[1, 300, 65535]], [[0, 2, 4]]])),
        (PixelFormat::UInt32, PixelBuffer::U32(array![[[1, 70000, u32::MAX]], [[0, 2, 4]]])),
        (PixelFormat::Float32, PixelBuffer::F32(array![[[0.5, -1.0, 1e6]], [[0.0, 2.0, 4.0]]])),
        (PixelFormat::Float64, PixelBuffer::F64(array![[[0.125, -1e-9, 3.0]], [[0.0, 2.0, 4.0]]])),
    ];
    for (format, pixels) in cases {
        let header = header_for(&pixels, format);
        let image = encode_and_read(&header, &ExtendedParams::new(), &QuantTable::default(), &pixels, CompressionMode::Raw);
        std::assert_eq!(image.pixels, pixels, "format {:?}", format);
        std::assert_eq!(image.header, header);
        std::assert_eq!(image.band_modes, vec![CompressionMode::Raw; 2]);
    }
}

#[test]
fn test_raw_keeps_parameters() {
    let pixels = PixelBuffer::U16(array![[[1, 2]], [[3, 4]], [[5, 6]]]);
    let mut params = ExtendedParams::new();
    params.insert(ExtendedParam::vector("WaveLengths", ParamVector::Doubles(vec![450.0, 550.0, 650.0])));
    params.insert(ExtendedParam::integer("Exposure", 20));

    let image = encode_and_read(&header_for(&pixels, PixelFormat::UInt16), &params, &QuantTable::default(), &pixels, CompressionMode::Raw);
    std::assert_eq!(image.params, params);
    std::assert_eq!(image.band_values("WaveLengths"), Some(vec![450.0, 550.0, 650.0]));
}

#[test]
fn test_deflate_round_trip_is_exact_for_codes() {
    let pixels = PixelBuffer::U8(gradient(3, 4, 5));
    let table = QuantTable::uniform(QuantParams::new(8, 0.0, 255.0).unwrap(), 3);
    let image = encode_and_read(&header_for(&pixels, PixelFormat::Byte), &ExtendedParams::new(), &table, &pixels, CompressionMode::Deflate);

    std::assert_eq!(image.pixels, PixelBuffer::F32(pixels.to_f32()));
    std::assert_eq!(image.quantification, table);
    std::assert_eq!(image.band_modes, vec![CompressionMode::Deflate; 3]);
}

#[test]
fn test_png_sixteen_bit_round_trip() {
    let pixels = PixelBuffer::U16(array![[[0, 1000, 65535], [12, 34, 56]]]);
    let table = QuantTable::uniform(QuantParams::new(16, 0.0, 65535.0).unwrap(), 1);
    let image = encode_and_read(&header_for(&pixels, PixelFormat::UInt16), &ExtendedParams::new(), &table, &pixels, CompressionMode::Png);

    std::assert_eq!(image.pixels, PixelBuffer::F32(pixels.to_f32()));
    std::assert_eq!(image.band_modes, vec![CompressionMode::Png]);
}

#[test]
fn test_fitted_quantization_stays_within_one_step() {
    let values = array![[[0.1f32, 0.2, 0.3], [0.4, 0.5, 0.6]], [[-2.0, 0.0, 2.0], [4.0, 6.0, 8.0]]];
    let pixels = PixelBuffer::F32(values.clone());
    let table = QuantTable::fit(&pixels, 12).unwrap();
    let image = encode_and_read(&header_for(&pixels, PixelFormat::Float32), &ExtendedParams::new(), &table, &pixels, CompressionMode::Deflate);

    let decoded = image.pixels.to_f32();
    for (band, params) in table.iter().enumerate() {
        let step = (1.0 / params.factor()) as f32;
        for (a, b) in decoded.index_axis(ndarray::Axis(0), band).iter()
            .zip(values.index_axis(ndarray::Axis(0), band).iter()) {
            std::assert!((a - b).abs() <= step, "band {}: {} vs {}", band, a, b);
        }
    }
}

#[test]
fn test_jpeg_round_trip_within_tolerance() {
    let source = gradient(1, 16, 16);
    let pixels = PixelBuffer::U8(source.clone());
    let table = QuantTable::uniform(QuantParams::new(8, 0.0, 255.0).unwrap(), 1);
    let image = encode_and_read(&header_for(&pixels, PixelFormat::Byte), &ExtendedParams::new(), &table, &pixels, CompressionMode::Jpeg);

    std::assert_eq!(image.band_modes, vec![CompressionMode::Jpeg]);
    let decoded = image.pixels.to_f32();
    for (a, b) in decoded.iter().zip(source.iter()) {
        std::assert!((a - *b as f32).abs() <= 8.0, "{} vs {}", a, b);
    }
}

#[test]
fn test_chunked_output_stores_quantification_parameter() {
    let pixels = PixelBuffer::U8(gradient(2, 2, 2));
    let table = QuantTable::uniform(QuantParams::new(8, 0.0, 255.0).unwrap(), 2);
    let image = encode_and_read(&header_for(&pixels, PixelFormat::Byte), &ExtendedParams::new(), &table, &pixels, CompressionMode::Png);
    std::assert!(image.params.get_text("BandQuantification").is_some());
}

#[test]
fn test_raw_with_quantification_is_rejected() {
    let pixels = PixelBuffer::U8(gradient(1, 2, 2));
    let table = QuantTable::uniform(QuantParams::new(8, 0.0, 255.0).unwrap(), 1);
    let result = HipsWriter::encode(&header_for(&pixels, PixelFormat::Byte), &ExtendedParams::new(), &table, &pixels, CompressionMode::Raw);
    std::assert!(result.is_err());
}

#[test]
fn test_chunked_without_quantification_is_rejected() {
    let pixels = PixelBuffer::U8(gradient(1, 2, 2));
    for mode in [CompressionMode::Deflate, CompressionMode::Png, CompressionMode::Jpeg] {
        let result = HipsWriter::encode(&header_for(&pixels, PixelFormat::Byte), &ExtendedParams::new(), &QuantTable::default(), &pixels, mode);
        std::assert!(result.is_err(), "{}", mode);
    }
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let pixels = PixelBuffer::U8(gradient(2, 2, 2));
    let header = HipsHeader::new(2, 3, 2, PixelFormat::Byte);
    let result = HipsWriter::encode(&header, &ExtendedParams::new(), &QuantTable::default(), &pixels, CompressionMode::Raw);
    std::assert!(result.is_err());
}

#[test]
fn test_raw_format_must_match_buffer() {
    let pixels = PixelBuffer::U16(array![[[1, 2]]]);
    let header = header_for(&pixels, PixelFormat::Float32);
    let result = HipsWriter::encode(&header, &ExtendedParams::new(), &QuantTable::default(), &pixels, CompressionMode::Raw);
    std::assert!(result.is_err());
}
