//! HIPS format constants

/// First header line of every HIPS file
pub const HIPS_MAGIC: &str = "HIPS";

/// Line terminator of the text sections
pub const NEWLINE: u8 = b'\n';

/// Padding byte tolerated after the binary section size
pub const SPACE: u8 = b' ';

/// Name of the extended parameter holding the quantification XML
pub const BAND_QUANTIFICATION: &str = "BandQuantification";

/// Root element written for the quantification XML
pub const QUANTIFICATION_ROOT: &str = "ArrayOfQuantificationParameters";

/// Size of the little-endian length prefix of each band chunk
pub const CHUNK_LENGTH_SIZE: u64 = 4;

/// Leading bytes identifying chunk codecs
pub mod signatures {
    pub const PNG: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
    pub const JPEG: [u8; 2] = [0xFF, 0xD8];
}

/// Default settings of the chunk codecs
pub mod codec_defaults {
    /// zlib compression level for deflate chunks
    pub const DEFLATE_LEVEL: u32 = 6;
    /// JPEG quality for JPEG chunks
    pub const JPEG_QUALITY: u8 = 90;
}
