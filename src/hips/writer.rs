//! HIPS file writer implementation
//!
//! Encoding is the inverse of decoding. A raw payload is written without
//! row padding so the reader infers a stride of exactly one row. A chunked
//! payload stores the quantification table as the `BandQuantification`
//! parameter and one length-prefixed chunk per band.

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, info};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::compression::{CompressionFactory, CompressionMode};
use crate::hips::constants::BAND_QUANTIFICATION;
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::header::HipsHeader;
use crate::hips::params::{ExtendedParam, ExtendedParams};
use crate::hips::pixel_format::PixelFormat;
use crate::hips::quantification::QuantTable;
use crate::hips::types::PixelBuffer;
use crate::hips::validation;

/// Writer for HIPS files
pub struct HipsWriter;

impl HipsWriter {
    /// Encodes an image into the bytes of a HIPS file
    ///
    /// # Arguments
    /// * `header` - Header describing `pixels`
    /// * `params` - Extended parameters to store
    /// * `quantification` - Per-band quantification; must be empty for `Raw`
    ///   and non-empty for the chunked modes
    /// * `pixels` - Band-major pixel buffer
    /// * `mode` - Payload compression
    ///
    /// # Returns
    /// The encoded file
    pub fn encode(
        header: &HipsHeader,
        params: &ExtendedParams,
        quantification: &QuantTable,
        pixels: &PixelBuffer,
        mode: CompressionMode,
    ) -> HipsResult<Vec<u8>> {
        check_geometry(header, pixels)?;

        let mut params = params.clone();
        let payload = match mode {
            CompressionMode::Raw => {
                if !quantification.is_empty() {
                    return Err(HipsError::GenericError(
                        "Raw payloads cannot be quantized; use a chunked mode".to_string(),
                    ));
                }
                check_raw_format(header, pixels)?;
                params.remove(BAND_QUANTIFICATION);
                pixels.to_le_bytes()
            }
            _ => {
                if quantification.is_empty() {
                    return Err(HipsError::GenericError(format!(
                        "{} payloads need a quantification table", mode
                    )));
                }
                params.insert(ExtendedParam::text(BAND_QUANTIFICATION, quantification.to_xml()?));
                encode_chunks(quantification, pixels, mode)?
            }
        };

        let mut out = Vec::with_capacity(payload.len() + 4096);
        header.write_to(&mut out)?;
        params.write_to(&mut out)?;
        let payload_offset = out.len();
        out.extend_from_slice(&payload);

        debug!("Encoded header and parameters in {} bytes, payload {} bytes", payload_offset, payload.len());
        Ok(out)
    }

    /// Encodes an image and writes it to `path`
    pub fn write_to_file(
        path: &str,
        header: &HipsHeader,
        params: &ExtendedParams,
        quantification: &QuantTable,
        pixels: &PixelBuffer,
        mode: CompressionMode,
    ) -> HipsResult<()> {
        let bytes = Self::encode(header, params, quantification, pixels, mode)?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        info!("Wrote {} bytes to {} ({} payload)", bytes.len(), path, mode);
        Ok(())
    }
}

fn check_geometry(header: &HipsHeader, pixels: &PixelBuffer) -> HipsResult<()> {
    validation::validate_geometry(header.height as u64, header.width as u64, 0)?;
    let expected = (header.effective_bands(), header.height, header.width);
    let actual = (pixels.bands(), pixels.height(), pixels.width());
    if expected != actual {
        return Err(HipsError::GenericError(format!(
            "Header describes {:?} (bands, height, width) but the buffer is {:?}", expected, actual
        )));
    }
    Ok(())
}

/// The header's format code must name the buffer's element type
fn check_raw_format(header: &HipsHeader, pixels: &PixelBuffer) -> HipsResult<()> {
    let format = PixelFormat::require(header.format_code, 0)?;
    if format.sample_type() != pixels.sample_type() {
        return Err(HipsError::GenericError(format!(
            "Header format {} ({}) does not store {} samples",
            header.format_code, format.name(), pixels.sample_type()
        )));
    }
    Ok(())
}

/// Quantizes and compresses every band in parallel, then frames the chunks
fn encode_chunks(quantification: &QuantTable, pixels: &PixelBuffer, mode: CompressionMode) -> HipsResult<Vec<u8>> {
    let handler = CompressionFactory::create_handler(mode)?;
    let chunks = pixels.planes()
        .into_par_iter()
        .enumerate()
        .map(|(band, plane)| {
            let stored = quantification.quantize_plane(band, &plane);
            handler.compress(&stored)
                .map_err(|e| HipsError::GenericError(format!("Band {}: {}", band, e)))
        })
        .collect::<HipsResult<Vec<Vec<u8>>>>()?;

    let mut payload = Vec::with_capacity(chunks.iter().map(|c| c.len() + 4).sum());
    for (band, chunk) in chunks.iter().enumerate() {
        let length = i32::try_from(chunk.len())
            .map_err(|_| HipsError::GenericError(format!("Band {} chunk exceeds the 2 GiB chunk limit", band)))?;
        payload.write_i32::<LittleEndian>(length)?;
        payload.extend_from_slice(chunk);
    }
    info!("Compressed {} bands with {}", chunks.len(), handler.name());
    Ok(payload)
}
