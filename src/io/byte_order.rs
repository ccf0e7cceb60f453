//! Little-endian sample conversion
//!
//! Every binary value in a HIPS file (deferred parameter vectors, raw pixel
//! rows, deflate band planes, chunk lengths) is little-endian. This module
//! gives each supported element type one strategy for moving between byte
//! slices and typed slices.

use byteorder::{ByteOrder as _, LittleEndian};

/// Element type that can be stored little-endian in a HIPS file
pub trait Sample: Copy + Default + Send + Sync + PartialEq + std::fmt::Debug + 'static {
    /// Size of one element in bytes
    const SIZE: usize;

    /// Decode `dst.len()` elements from `src`
    ///
    /// `src` must hold exactly `dst.len() * SIZE` bytes.
    fn read_into(src: &[u8], dst: &mut [Self]);

    /// Encode `src` into `dst`
    ///
    /// `dst` must hold exactly `src.len() * SIZE` bytes.
    fn write_into(src: &[Self], dst: &mut [u8]);

    /// Widen to f64 for statistics and dequantization
    fn to_f64(self) -> f64;
}

impl Sample for u8 {
    const SIZE: usize = 1;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        dst.copy_from_slice(src);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        dst.copy_from_slice(src);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for u16 {
    const SIZE: usize = 2;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_u16_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_u16_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for i16 {
    const SIZE: usize = 2;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_i16_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_i16_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for u32 {
    const SIZE: usize = 4;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_u32_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_u32_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for i32 {
    const SIZE: usize = 4;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_i32_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_i32_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f32 {
    const SIZE: usize = 4;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_f32_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_f32_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const SIZE: usize = 8;

    fn read_into(src: &[u8], dst: &mut [Self]) {
        LittleEndian::read_f64_into(src, dst);
    }

    fn write_into(src: &[Self], dst: &mut [u8]) {
        LittleEndian::write_f64_into(src, dst);
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Decode a whole byte slice into a vector of samples
///
/// Trailing bytes that do not form a complete element are ignored.
pub fn decode_samples<T: Sample>(bytes: &[u8]) -> Vec<T> {
    let count = bytes.len() / T::SIZE;
    let mut values = vec![T::default(); count];
    T::read_into(&bytes[..count * T::SIZE], &mut values);
    values
}

/// Encode samples into a freshly allocated byte vector
pub fn encode_samples<T: Sample>(values: &[T]) -> Vec<u8> {
    let mut bytes = vec![0u8; values.len() * T::SIZE];
    T::write_into(values, &mut bytes);
    bytes
}
