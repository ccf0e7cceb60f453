use std::io::{Cursor, Seek};

use super::test_utils::{le_i32s, HipsFileBuilder};
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::header::HipsHeader;
use crate::hips::params::{ExtendedParam, ExtendedParams, ParamFormat, ParamValue, ParamVector};

fn read_params(bytes: Vec<u8>) -> (HipsResult<ExtendedParams>, Cursor<Vec<u8>>) {
    let mut cursor = Cursor::new(bytes);
    HipsHeader::read(&mut cursor).unwrap();
    let params = ExtendedParams::read(&mut cursor);
    (params, cursor)
}

#[test]
fn test_int_vector_resolved_from_binary_section() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    let offset = builder.push_binary(&le_i32s(&[1, 2, 3]));
    let builder = builder.param(&format!("Gains i 3 {}", offset)).payload(&[9]);
    let (params, _) = read_params(builder.build());
    let params = params.unwrap();

    std::assert_eq!(offset, 0);
    std::assert_eq!(params.get("Gains").unwrap().value, ParamValue::Vector(ParamVector::Ints(vec![1, 2, 3])));
    std::assert_eq!(params.get_values("Gains"), Some(vec![1.0, 2.0, 3.0]));
}

#[test]
fn test_inline_scalars() {
    let builder = HipsFileBuilder::new(1, 1, 1, 0)
        .param("Exposure i 1 250")
        .param("Gain f 1 1.5")
        .param("Camera c 1 Spectral Cam");
    let (params, _) = read_params(builder.build());
    let params = params.unwrap();

    std::assert_eq!(params.len(), 3);
    std::assert_eq!(params.get_integer("Exposure"), Some(250));
    std::assert_eq!(params.get_values("Gain"), Some(vec![1.5]));
    std::assert_eq!(params.get_text("Camera"), Some("Spectral Cam"));
    std::assert_eq!(params.get("Gain").unwrap().format, ParamFormat::Float);
}

#[test]
fn test_char_vector_becomes_text() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    builder.push_binary(b"xx");
    let offset = builder.push_binary(b"Lab bench");
    let builder = builder.param(&format!("Location c 9 {}", offset));
    let (params, _) = read_params(builder.build());
    std::assert_eq!(params.unwrap().get_text("Location"), Some("Lab bench"));
}

#[test]
fn test_double_vector() {
    let mut builder = HipsFileBuilder::new(1, 1, 2, 0);
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&450.5f64.to_le_bytes());
    bytes.extend_from_slice(&700.25f64.to_le_bytes());
    let offset = builder.push_binary(&bytes);
    let builder = builder.param(&format!("WaveLengths d 2 {}", offset));
    let (params, _) = read_params(builder.build());
    std::assert_eq!(params.unwrap().get_values("WaveLengths"), Some(vec![450.5, 700.25]));
}

#[test]
fn test_deferred_range_outside_section_is_truncated() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    builder.push_binary(&le_i32s(&[1, 2]));
    let builder = builder.param("Gains i 3 0").payload(&[0; 64]);
    let (params, _) = read_params(builder.build());
    std::assert!(matches!(params, Err(HipsError::Truncated { .. })));
}

#[test]
fn test_binary_size_beyond_stream_is_truncated() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    builder.push_binary(&le_i32s(&[1]));
    let builder = builder.binary_size(400);
    let (params, _) = read_params(builder.build());
    std::assert!(matches!(params, Err(HipsError::Truncated { .. })));
}

#[test]
fn test_padding_after_size_line_is_skipped() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    let offset = builder.push_binary(&le_i32s(&[7, 8]));
    let builder = builder
        .param(&format!("Gains i 2 {}", offset))
        .after_size("   \n")
        .payload(&[42]);
    let (params, mut cursor) = read_params(builder.build());

    std::assert_eq!(params.unwrap().get_values("Gains"), Some(vec![7.0, 8.0]));
    let total = cursor.get_ref().len() as u64;
    std::assert_eq!(cursor.stream_position().unwrap(), total - 1);
}

#[test]
fn test_reader_stops_at_end_of_binary_section() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    let first = builder.push_binary(&le_i32s(&[1, 2]));
    let second = builder.push_binary(b"abc");
    let builder = builder
        .param(&format!("Second c 3 {}", second))
        .param(&format!("First i 2 {}", first))
        .payload(&[1, 2, 3, 4]);
    let (params, mut cursor) = read_params(builder.build());
    let params = params.unwrap();

    std::assert_eq!(params.get_text("Second"), Some("abc"));
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    std::assert_eq!(names, vec!["Second", "First"]);
    let total = cursor.get_ref().len() as u64;
    std::assert_eq!(cursor.stream_position().unwrap(), total - 4);
}

#[test]
fn test_invalid_count_is_format_error() {
    let builder = HipsFileBuilder::new(1, 1, 1, 0).param("Bad i many 0");
    let (params, _) = read_params(builder.build());
    std::assert!(matches!(params, Err(HipsError::Format { .. })));
}

#[test]
fn test_invalid_inline_number_is_format_error() {
    let builder = HipsFileBuilder::new(1, 1, 1, 0).param("Bad i 1 1.5");
    let (params, _) = read_params(builder.build());
    std::assert!(matches!(params, Err(HipsError::Format { .. })));
}

#[test]
fn test_missing_declaration_is_truncated() {
    let mut bytes = HipsFileBuilder::new(1, 1, 1, 0).build();
    // Claim two declarations when none follow
    let header_len = bytes.len() - "0\n0\n".len();
    bytes.truncate(header_len);
    bytes.extend_from_slice(b"2\nOnly i 1 4\n");
    let (params, _) = read_params(bytes);
    std::assert!(matches!(params, Err(HipsError::Truncated { .. })));
}

#[test]
fn test_unknown_format_reads_bytes() {
    let mut builder = HipsFileBuilder::new(1, 1, 1, 0);
    let offset = builder.push_binary(&[3, 4, 5]);
    let builder = builder.param(&format!("Odd x 3 {}", offset));
    let (params, _) = read_params(builder.build());
    let params = params.unwrap();
    let param = params.get("Odd").unwrap();

    std::assert_eq!(param.format, ParamFormat::Other('x'));
    std::assert_eq!(param.value, ParamValue::Vector(ParamVector::Bytes(vec![3, 4, 5])));
}

#[test]
fn test_written_table_reads_back() {
    let mut params = ExtendedParams::new();
    params.insert(ExtendedParam::integer("Exposure", 12));
    params.insert(ExtendedParam::float("Gain", 0.75));
    params.insert(ExtendedParam::text("Note", "multi word\nnote"));
    params.insert(ExtendedParam::text("Flag", "y"));
    params.insert(ExtendedParam::vector("WaveLengths", ParamVector::Floats(vec![400.0, 500.0, 600.0])));
    params.insert(ExtendedParam::vector("Offsets", ParamVector::Shorts(vec![-3, 3])));

    let mut bytes = Vec::new();
    params.write_to(&mut bytes).unwrap();
    bytes.push(0xAB);

    let mut cursor = Cursor::new(bytes);
    let read = ExtendedParams::read(&mut cursor).unwrap();
    std::assert_eq!(read, params);
    let total = cursor.get_ref().len() as u64;
    std::assert_eq!(cursor.stream_position().unwrap(), total - 1);
}

#[test]
fn test_single_element_vector_is_written_inline() {
    let mut params = ExtendedParams::new();
    params.insert(ExtendedParam::vector("WaveLengths", ParamVector::Doubles(vec![532.0])));

    let mut bytes = Vec::new();
    params.write_to(&mut bytes).unwrap();
    std::assert_eq!(bytes, b"1\nWaveLengths d 1 532\n0\n\n".to_vec());

    let read = ExtendedParams::read(&mut Cursor::new(bytes)).unwrap();
    std::assert_eq!(read.get_values("WaveLengths"), Some(vec![532.0]));
}

#[test]
fn test_binary_starting_with_space_survives_round_trip() {
    let mut params = ExtendedParams::new();
    params.insert(ExtendedParam::text("Padded", " leading"));

    let mut bytes = Vec::new();
    params.write_to(&mut bytes).unwrap();
    let read = ExtendedParams::read(&mut Cursor::new(bytes)).unwrap();
    std::assert_eq!(read.get_text("Padded"), Some(" leading"));
}
