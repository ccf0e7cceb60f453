//! Chunked payload extraction
//!
//! A chunked payload holds one length-prefixed chunk per band. Chunk
//! boundaries are found with one sequential scan; the chunks are then
//! decoded independently on the rayon pool.

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::compression::{ChunkContext, CompressionFactory, CompressionMode};
use crate::hips::constants::CHUNK_LENGTH_SIZE;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::header::HipsHeader;
use crate::hips::quantification::QuantTable;
use crate::hips::types::{BandPlane, PixelBuffer};
use crate::hips::validation;
use crate::io::line_reader;
use crate::io::seekable::SeekableReader;

/// One band's compressed bytes and where they came from
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub band: usize,
    /// Offset of the first payload byte, after the length prefix
    pub offset: u64,
    pub data: Vec<u8>,
}

/// Reads chunk framed payloads
pub struct ChunkReader<'a> {
    header: &'a HipsHeader,
    quantification: &'a QuantTable,
}

impl<'a> ChunkReader<'a> {
    pub fn new(header: &'a HipsHeader, quantification: &'a QuantTable) -> Self {
        ChunkReader { header, quantification }
    }

    /// Reads and decodes one chunk per band
    ///
    /// # Arguments
    /// * `reader` - Reader positioned at the first chunk length
    ///
    /// # Returns
    /// The stacked bands and the codec each chunk used
    pub fn read(&self, reader: &mut dyn SeekableReader) -> HipsResult<(PixelBuffer, Vec<CompressionMode>)> {
        let offset = line_reader::position(reader)?;
        validation::validate_geometry(self.header.height as u64, self.header.width as u64, offset)?;

        let chunks = self.scan_chunks(reader)?;
        let trailing = line_reader::remaining_bytes(reader)?;
        if trailing > 0 {
            warn!("Ignoring {} bytes after the last band chunk", trailing);
        }

        let decoded = chunks
            .into_par_iter()
            .map(|chunk| self.decode_chunk(chunk))
            .collect::<HipsResult<Vec<_>>>()?;
        let (planes, modes): (Vec<BandPlane>, Vec<CompressionMode>) = decoded.into_iter().unzip();

        let buffer = PixelBuffer::from_bands(planes)?;
        info!("Read {} band chunks ({}), samples {}",
              modes.len(), summarize_modes(&modes), buffer.sample_type());
        Ok((buffer, modes))
    }

    /// Locates every band chunk in order
    ///
    /// Each chunk starts where the previous one ended, so this pass is
    /// sequential. The stream end is looked up once; lengths are checked
    /// against it before anything is read and the position is tracked from
    /// the bytes consumed.
    pub fn scan_chunks(&self, reader: &mut dyn SeekableReader) -> HipsResult<Vec<RawChunk>> {
        let bands = self.header.effective_bands();
        let mut chunks = Vec::with_capacity(bands);
        let end = validation::get_stream_size(reader)?;
        let mut position = line_reader::position(reader)?;

        for band in 0..bands {
            let length_offset = position;
            let remaining = end.saturating_sub(position);
            if remaining < CHUNK_LENGTH_SIZE {
                return Err(HipsError::truncated(length_offset, format!(
                    "missing length of band {} chunk ({} of {} bands read)", band, band, bands
                )));
            }
            let length = reader.read_i32::<LittleEndian>()
                .map_err(|e| HipsError::from_read(e, length_offset, "chunk length"))?;
            if length < 0 {
                return Err(HipsError::truncated(length_offset, format!(
                    "band {} chunk has negative length {}", band, length
                )));
            }

            let length = length as u64;
            let offset = length_offset + CHUNK_LENGTH_SIZE;
            let available = remaining - CHUNK_LENGTH_SIZE;
            if length > available {
                return Err(HipsError::truncated(offset, format!(
                    "band {} chunk declares {} bytes but only {} remain", band, length, available
                )));
            }

            let data = line_reader::read_checked_block(reader, offset, length, "band chunk")?;
            debug!("Band {} chunk: {} bytes at {}", band, length, offset);
            chunks.push(RawChunk { band, offset, data });
            position = offset + length;
        }

        Ok(chunks)
    }

    fn decode_chunk(&self, chunk: RawChunk) -> HipsResult<(BandPlane, CompressionMode)> {
        let context = ChunkContext {
            band: chunk.band,
            offset: chunk.offset,
            height: self.header.height,
            width: self.header.width,
            quantized: self.quantification.get(chunk.band).is_some(),
            declared_type: self.header.pixel_format().map(|f| f.sample_type()),
        };

        let handler = CompressionFactory::detect(&chunk.data)?;
        let plane = handler.decompress(&chunk.data, &context)?;
        context.check_dimensions(plane.height(), plane.width())?;
        debug!("Band {}: {} chunk decoded to {}", chunk.band, handler.name(), plane.sample_type());

        Ok((self.quantification.dequantize_plane(chunk.band, plane), handler.mode()))
    }
}

/// Short description of the codecs used, e.g. "png x3, deflate x1"
pub fn summarize_modes(modes: &[CompressionMode]) -> String {
    let mut counts: Vec<(CompressionMode, usize)> = Vec::new();
    for mode in modes {
        match counts.iter_mut().find(|(m, _)| m == mode) {
            Some((_, n)) => *n += 1,
            None => counts.push((*mode, 1)),
        }
    }
    counts.iter()
        .map(|(mode, n)| format!("{} x{}", mode, n))
        .collect::<Vec<_>>()
        .join(", ")
}
