//! Pixel format codes and sample types

use std::fmt;

use crate::hips::definitions;
use crate::hips::errors::{HipsError, HipsResult};

/// Element type of a pixel buffer or band plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    U8,
    U16,
    U32,
    F32,
    F64,
}

impl SampleType {
    /// Size of one sample in bytes
    pub fn size(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
            SampleType::U32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    /// Whether the type holds integers
    pub fn is_integer(&self) -> bool {
        matches!(self, SampleType::U8 | SampleType::U16 | SampleType::U32)
    }

    /// The header format code that stores this sample type
    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            SampleType::U8 => PixelFormat::Byte,
            SampleType::U16 => PixelFormat::UInt16,
            SampleType::U32 => PixelFormat::UInt32,
            SampleType::F32 => PixelFormat::Float32,
            SampleType::F64 => PixelFormat::Float64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::U16 => "uint16",
            SampleType::U32 => "uint32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Pixel format code of a HIPS header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Code 0
    Byte,
    /// Code 1
    UInt16,
    /// Code 2
    UInt32,
    /// Code 3
    Float32,
    /// Code 6
    Float64,
    /// Code 35, three interleaved byte bands
    ByteRgb,
}

impl PixelFormat {
    /// Maps a header format code, or None for codes outside the table
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PixelFormat::Byte),
            1 => Some(PixelFormat::UInt16),
            2 => Some(PixelFormat::UInt32),
            3 => Some(PixelFormat::Float32),
            6 => Some(PixelFormat::Float64),
            35 => Some(PixelFormat::ByteRgb),
            _ => None,
        }
    }

    /// Like `from_code` but fails with an unsupported format error reported at `offset`
    pub fn require(code: u32, offset: u64) -> HipsResult<Self> {
        Self::from_code(code).ok_or(HipsError::UnsupportedPixelFormat {
            offset,
            code: code as i64,
        })
    }

    pub fn code(&self) -> u32 {
        match self {
            PixelFormat::Byte => 0,
            PixelFormat::UInt16 => 1,
            PixelFormat::UInt32 => 2,
            PixelFormat::Float32 => 3,
            PixelFormat::Float64 => 6,
            PixelFormat::ByteRgb => 35,
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            PixelFormat::Byte | PixelFormat::ByteRgb => SampleType::U8,
            PixelFormat::UInt16 => SampleType::U16,
            PixelFormat::UInt32 => SampleType::U32,
            PixelFormat::Float32 => SampleType::F32,
            PixelFormat::Float64 => SampleType::F64,
        }
    }

    /// Bytes per pixel on disk
    pub fn pixel_size(&self) -> usize {
        self.sample_type().size()
    }

    /// Name from the definitions table
    pub fn name(&self) -> String {
        definitions::pixel_format_name(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table() {
        let expected = [(0, 1), (1, 2), (2, 4), (3, 4), (6, 8), (35, 1)];
        for (code, size) in expected {
            let format = PixelFormat::from_code(code).unwrap();
            std::assert_eq!(format.pixel_size(), size);
            std::assert_eq!(format.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_unsupported() {
        let err = PixelFormat::require(4, 120).unwrap_err();
        std::assert!(matches!(err, HipsError::UnsupportedPixelFormat { offset: 120, code: 4 }));
    }

    #[test]
    fn test_byte_rgb_maps_to_u8() {
        std::assert_eq!(PixelFormat::ByteRgb.sample_type(), SampleType::U8);
        std::assert_eq!(SampleType::U8.pixel_format(), PixelFormat::Byte);
    }
}
