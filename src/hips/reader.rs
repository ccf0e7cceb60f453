//! HIPS file reader implementation
//!
//! Runs the decode pipeline: header, extended parameters, quantification
//! table, then the payload in whichever layout the quantification implies.

use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::extractor;
use crate::hips::errors::HipsResult;
use crate::hips::header::HipsHeader;
use crate::hips::image::HipsImage;
use crate::hips::params::ExtendedParams;
use crate::hips::quantification::QuantTable;
use crate::io::line_reader;
use crate::io::seekable::SeekableReader;

/// Reader for HIPS files
#[derive(Debug, Default)]
pub struct HipsReader {
    /// Current file path
    current_file: Option<String>,
}

impl HipsReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the last file passed to `load`
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Loads a HIPS file from the given path
    ///
    /// # Arguments
    /// * `filepath` - Path to the HIPS file to load
    ///
    /// # Returns
    /// The decoded image
    pub fn load(&mut self, filepath: &str) -> HipsResult<HipsImage> {
        info!("Loading HIPS file: {}", filepath);
        self.current_file = Some(filepath.to_string());

        let file = File::open(Path::new(filepath))?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file); // 1MB buffer

        self.read(&mut reader)
    }

    /// Decodes a HIPS image from a stream positioned at its first byte
    ///
    /// # Arguments
    /// * `reader` - Any struct implementing the SeekableReader trait
    ///
    /// # Returns
    /// The decoded image; fatal problems are errors carrying a byte offset,
    /// recoverable metadata problems end up in `HipsImage::warnings`
    pub fn read(&self, reader: &mut dyn SeekableReader) -> HipsResult<HipsImage> {
        let header = HipsHeader::read(reader)?;
        let params = ExtendedParams::read(reader)?;
        let (quantification, warning) = QuantTable::from_params(&params);
        debug!("Payload starts at byte {}", line_reader::position(reader)?);

        let (pixels, band_modes) = extractor::read_payload(reader, &header, &quantification)?;

        Ok(HipsImage {
            header,
            params,
            quantification,
            pixels,
            band_modes,
            warnings: warning.into_iter().collect(),
        })
    }
}
