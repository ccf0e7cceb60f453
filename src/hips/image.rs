//! Decoded HIPS image
//!
//! Everything a decode produces in one value: header, parameter table,
//! quantification, pixels, the codec of each band and any recoverable
//! metadata warnings.

use log::debug;
use std::fmt;

use crate::compression::CompressionMode;
use crate::extractor::summarize_modes;
use crate::hips::constants::BAND_QUANTIFICATION;
use crate::hips::definitions;
use crate::hips::errors::{HipsError, HipsResult, MetadataWarning};
use crate::hips::header::HipsHeader;
use crate::hips::params::{ExtendedParam, ExtendedParams, ParamValue};
use crate::hips::quantification::QuantTable;
use crate::hips::types::PixelBuffer;

/// A decoded HIPS file
#[derive(Debug, Clone, PartialEq)]
pub struct HipsImage {
    pub header: HipsHeader,
    pub params: ExtendedParams,
    pub quantification: QuantTable,
    /// Band-major pixels `(band, row, column)`
    pub pixels: PixelBuffer,
    /// Compression mode of each band, `Raw` for every band of a raw payload
    pub band_modes: Vec<CompressionMode>,
    pub warnings: Vec<MetadataWarning>,
}

impl HipsImage {
    /// Splits the image into the four decode outputs
    pub fn into_parts(self) -> (HipsHeader, ExtendedParams, QuantTable, PixelBuffer) {
        (self.header, self.params, self.quantification, self.pixels)
    }

    pub fn band_count(&self) -> usize {
        self.pixels.bands()
    }

    /// Per-band values of a vector parameter such as `WaveLengths`
    pub fn band_values(&self, name: &str) -> Option<Vec<f64>> {
        self.params.get_values(name)
    }

    /// Keeps only the listed bands, in the given order
    ///
    /// Per-band parameters and the quantification table are reduced to the
    /// same bands. The header's band count becomes the number of selected
    /// bands.
    ///
    /// # Arguments
    /// * `indexes` - Band indexes, each below `band_count()`
    ///
    /// # Returns
    /// The reduced image, or an error if the list is empty or an index is out of range
    pub fn select_bands(&self, indexes: &[usize]) -> HipsResult<HipsImage> {
        let bands = self.band_count();
        if indexes.is_empty() {
            return Err(HipsError::GenericError("No bands selected".to_string()));
        }
        if let Some(bad) = indexes.iter().find(|&&i| i >= bands) {
            return Err(HipsError::GenericError(format!(
                "Band index {} is out of range for an image with {} bands", bad, bands
            )));
        }

        let selected = indexes.len();
        let mut header = self.header.clone();
        header.nominal_bands = selected;
        header.frame_count = header.frame_count.min(selected);

        let mut params = ExtendedParams::new();
        for param in self.params.iter() {
            params.insert(select_param(param, indexes, bands));
        }

        let quantification = self.quantification.select(indexes);
        if quantification.is_empty() {
            params.remove(BAND_QUANTIFICATION);
        } else {
            params.insert(ExtendedParam::text(BAND_QUANTIFICATION, quantification.to_xml()?));
        }

        let band_modes = indexes.iter()
            .map(|&i| self.band_modes.get(i).copied().unwrap_or(CompressionMode::Raw))
            .collect();

        debug!("Selected bands {:?} of {}", indexes, bands);
        Ok(HipsImage {
            header,
            params,
            quantification,
            pixels: self.pixels.select_bands(indexes),
            band_modes,
            warnings: self.warnings.clone(),
        })
    }
}

/// Reduces a per-band vector parameter to the selected bands
///
/// Only parameters listed as per-band whose length matches the band count
/// are touched.
fn select_param(param: &ExtendedParam, indexes: &[usize], bands: usize) -> ExtendedParam {
    match &param.value {
        ParamValue::Vector(vector) if vector.len() == bands && definitions::is_per_band_parameter(&param.name) => {
            ExtendedParam {
                name: param.name.clone(),
                format: param.format,
                value: ParamValue::Vector(vector.select(indexes)),
            }
        }
        _ => param.clone(),
    }
}

impl fmt::Display for HipsImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        writeln!(f, "Pixels: {} bands of {}x{} {}",
                 self.pixels.bands(), self.pixels.width(), self.pixels.height(), self.pixels.sample_type())?;
        writeln!(f, "Compression: {}", summarize_modes(&self.band_modes))?;
        if !self.quantification.is_empty() {
            writeln!(f, "Quantification: {} bands", self.quantification.len())?;
        }
        writeln!(f, "Extended parameters: {}", self.params.len())?;
        for warning in &self.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        Ok(())
    }
}
