//! Raw payload extraction
//!
//! An uncompressed payload is one block holding every band back to back.
//! Rows may be padded, so the row stride is not stored anywhere: it is
//! derived from the payload size, the band count and the height.

use log::{debug, info};
use ndarray::Array3;
use rayon::prelude::*;

use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::header::HipsHeader;
use crate::hips::pixel_format::{PixelFormat, SampleType};
use crate::hips::types::PixelBuffer;
use crate::hips::validation;
use crate::io::byte_order::{decode_samples, Sample};
use crate::io::line_reader;
use crate::io::seekable::SeekableReader;

/// Byte layout of a raw payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    pub bands: usize,
    pub height: usize,
    pub width: usize,
    /// Bytes per band
    pub band_bytes: usize,
    /// Bytes per stored row, padding included
    pub stride: usize,
    /// Bytes per row without padding
    pub row_bytes: usize,
}

impl RawLayout {
    /// Derives the row stride of a payload of `payload_len` bytes
    ///
    /// # Arguments
    /// * `header` - Parsed header with the band geometry
    /// * `format` - Pixel format of the payload
    /// * `payload_len` - Bytes from the payload start to the end of the stream
    /// * `offset` - Payload start, reported on errors
    ///
    /// # Returns
    /// The layout, or a format error if the size does not divide into
    /// bands and rows or the stride is smaller than a row
    pub fn infer(header: &HipsHeader, format: PixelFormat, payload_len: u64, offset: u64) -> HipsResult<Self> {
        validation::validate_geometry(header.height as u64, header.width as u64, offset)?;
        let bands = header.effective_bands();
        let payload_len = usize::try_from(payload_len)
            .map_err(|_| HipsError::format(offset, "raw payload does not fit in memory"))?;

        if payload_len % bands != 0 {
            return Err(HipsError::format(offset, format!(
                "raw payload of {} bytes does not divide into {} bands", payload_len, bands
            )));
        }
        let band_bytes = payload_len / bands;
        if band_bytes % header.height != 0 {
            return Err(HipsError::format(offset, format!(
                "band of {} bytes does not divide into {} rows", band_bytes, header.height
            )));
        }
        let stride = band_bytes / header.height;
        let row_bytes = header.width.checked_mul(format.pixel_size())
            .ok_or_else(|| HipsError::format(offset, "row size overflows"))?;
        if stride < row_bytes {
            return Err(HipsError::format(offset, format!(
                "stride smaller than declared width ({} < {} bytes)", stride, row_bytes
            )));
        }

        Ok(RawLayout { bands, height: header.height, width: header.width, band_bytes, stride, row_bytes })
    }

    /// Whether rows carry padding bytes
    pub fn is_padded(&self) -> bool {
        self.stride > self.row_bytes
    }
}

/// Reads uncompressed payloads
pub struct RawReader<'a> {
    header: &'a HipsHeader,
}

impl<'a> RawReader<'a> {
    pub fn new(header: &'a HipsHeader) -> Self {
        RawReader { header }
    }

    /// Reads the rest of the stream as a raw payload
    ///
    /// # Arguments
    /// * `reader` - Reader positioned at the first payload byte
    ///
    /// # Returns
    /// A buffer of shape `(bands, height, width)` with the format's element type
    pub fn read(&self, reader: &mut dyn SeekableReader) -> HipsResult<PixelBuffer> {
        let offset = line_reader::position(reader)?;
        let format = PixelFormat::require(self.header.format_code, offset)?;
        let remaining = line_reader::remaining_bytes(reader)?;
        let layout = RawLayout::infer(self.header, format, remaining, offset)?;
        debug!("Raw payload at {}: {} bands, stride {} bytes, row {} bytes",
               offset, layout.bands, layout.stride, layout.row_bytes);

        let bytes = line_reader::read_checked_block(reader, offset, remaining, "raw pixel payload")?;
        let buffer = match format.sample_type() {
            SampleType::U8 => PixelBuffer::U8(crop_bands(&bytes, &layout, offset)?),
            SampleType::U16 => PixelBuffer::U16(crop_bands(&bytes, &layout, offset)?),
            SampleType::U32 => PixelBuffer::U32(crop_bands(&bytes, &layout, offset)?),
            SampleType::F32 => PixelBuffer::F32(crop_bands(&bytes, &layout, offset)?),
            SampleType::F64 => PixelBuffer::F64(crop_bands(&bytes, &layout, offset)?),
        };

        info!("Read raw payload: {} bands of {}x{} {}{}",
              layout.bands, layout.width, layout.height, format.name(),
              if layout.is_padded() { " (padded rows)" } else { "" });
        Ok(buffer)
    }
}

/// Drops row padding and decodes every band in parallel
fn crop_bands<T: Sample>(bytes: &[u8], layout: &RawLayout, offset: u64) -> HipsResult<Array3<T>> {
    let bands: Vec<Vec<T>> = bytes
        .par_chunks(layout.band_bytes)
        .map(|band| {
            let mut cropped = Vec::with_capacity(layout.height * layout.row_bytes);
            for row in band.chunks(layout.stride) {
                cropped.extend_from_slice(&row[..layout.row_bytes]);
            }
            decode_samples::<T>(&cropped)
        })
        .collect();

    let values: Vec<T> = bands.into_iter().flatten().collect();
    Array3::from_shape_vec((layout.bands, layout.height, layout.width), values)
        .map_err(|e| HipsError::format(offset, format!("raw payload does not match geometry: {}", e)))
}
