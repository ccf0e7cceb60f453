//! Pixel payload extraction
//!
//! The payload after the parameter table is either one raw block or a
//! sequence of per-band chunks. Which one is decided by the quantification
//! table alone: quantized files are always chunk framed.

mod raw_reader;
mod chunk_reader;

pub use raw_reader::{RawLayout, RawReader};
pub use chunk_reader::{summarize_modes, ChunkReader, RawChunk};

use log::debug;

use crate::compression::CompressionMode;
use crate::hips::errors::HipsResult;
use crate::hips::header::HipsHeader;
use crate::hips::quantification::QuantTable;
use crate::hips::types::PixelBuffer;
use crate::io::seekable::SeekableReader;

/// Framing of a pixel payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLayout {
    /// One contiguous block
    Raw,
    /// One length-prefixed chunk per band
    Chunked,
}

impl PayloadLayout {
    /// Chunked when any band is quantized, raw otherwise
    pub fn resolve(quantification: &QuantTable) -> Self {
        if quantification.is_empty() {
            PayloadLayout::Raw
        } else {
            PayloadLayout::Chunked
        }
    }
}

/// Reads the payload at the reader's position
///
/// # Returns
/// The pixel buffer and the compression mode of each band
pub fn read_payload(
    reader: &mut dyn SeekableReader,
    header: &HipsHeader,
    quantification: &QuantTable,
) -> HipsResult<(PixelBuffer, Vec<CompressionMode>)> {
    let layout = PayloadLayout::resolve(quantification);
    debug!("Payload layout: {:?}", layout);
    match layout {
        PayloadLayout::Raw => {
            let buffer = RawReader::new(header).read(reader)?;
            Ok((buffer, vec![CompressionMode::Raw; header.effective_bands()]))
        }
        PayloadLayout::Chunked => ChunkReader::new(header, quantification).read(reader),
    }
}
