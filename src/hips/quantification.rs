//! Per-band quantification
//!
//! Quantized bands store integers that map linearly onto a float range.
//! The per-band parameters come from the `BandQuantification` extended
//! parameter, an XML document with one `QuantificationParameters` element
//! per band.

use log::{debug, warn};
use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hips::constants::BAND_QUANTIFICATION;
use crate::hips::errors::{HipsError, HipsResult, MetadataWarning};
use crate::hips::params::ExtendedParams;
use crate::hips::pixel_format::SampleType;
use crate::hips::types::{BandPlane, PixelBuffer};

/// Largest supported bit depth
pub const MAX_BITS: u8 = 32;

/// Linear scaling of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    /// Bit depth of the stored integers
    pub q: u8,
    pub q_min: f64,
    pub q_max: f64,
}

impl QuantParams {
    /// Creates parameters, rejecting bit depths outside 1..=32 and empty ranges
    pub fn new(q: u8, q_min: f64, q_max: f64) -> HipsResult<Self> {
        if q == 0 || q > MAX_BITS {
            return Err(HipsError::GenericError(format!("Quantification bit depth {} is outside 1..={}", q, MAX_BITS)));
        }
        if !q_min.is_finite() || !q_max.is_finite() || q_max <= q_min {
            return Err(HipsError::GenericError(format!(
                "Quantification range [{}, {}] is empty or not finite", q_min, q_max
            )));
        }
        Ok(QuantParams { q, q_min, q_max })
    }

    /// Largest stored integer, `2^Q - 1`
    pub fn max_code(&self) -> u32 {
        ((1u64 << self.q) - 1) as u32
    }

    /// `(2^Q - 1) / (Q_Max - Q_Min)`
    pub fn factor(&self) -> f64 {
        self.max_code() as f64 / (self.q_max - self.q_min)
    }

    pub fn dequantize(&self, raw: f64) -> f32 {
        (raw / self.factor() + self.q_min) as f32
    }

    /// Nearest stored integer for `value`, clamped to `[0, 2^Q - 1]`
    pub fn quantize(&self, value: f64) -> u32 {
        let code = ((value - self.q_min) * self.factor()).round();
        if code.is_nan() {
            return 0;
        }
        code.clamp(0.0, self.max_code() as f64) as u32
    }

    /// Smallest element type that holds every stored integer
    pub fn storage_type(&self) -> SampleType {
        match self.q {
            0..=8 => SampleType::U8,
            9..=16 => SampleType::U16,
            _ => SampleType::U32,
        }
    }
}

impl fmt::Display for QuantParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q={} range [{}, {}]", self.q, self.q_min, self.q_max)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "ArrayOfQuantificationParameters")]
struct QuantificationDocument {
    #[serde(rename = "QuantificationParameters", default)]
    entries: Vec<QuantificationEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuantificationEntry {
    #[serde(rename = "@Q_Min")]
    q_min: f64,
    #[serde(rename = "@Q_Max")]
    q_max: f64,
    #[serde(rename = "@Q")]
    q: i64,
}

/// Ordered per-band quantification parameters
///
/// An empty table means no band is quantized and the payload is a raw block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantTable {
    bands: Vec<QuantParams>,
}

impl QuantTable {
    pub fn new(bands: Vec<QuantParams>) -> Self {
        QuantTable { bands }
    }

    /// Same parameters for `band_count` bands
    pub fn uniform(params: QuantParams, band_count: usize) -> Self {
        QuantTable { bands: vec![params; band_count] }
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn get(&self, band: usize) -> Option<&QuantParams> {
        self.bands.get(band)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuantParams> {
        self.bands.iter()
    }

    /// Builds the table from the extended parameters
    ///
    /// A missing parameter gives an empty table. A parameter that is not
    /// text, is not parseable XML, or holds invalid entries also gives an
    /// empty table, together with a warning.
    pub fn from_params(params: &ExtendedParams) -> (Self, Option<MetadataWarning>) {
        if !params.contains(BAND_QUANTIFICATION) {
            return (QuantTable::default(), None);
        }
        let Some(xml) = params.get_text(BAND_QUANTIFICATION) else {
            let warning = MetadataWarning::new(BAND_QUANTIFICATION, "parameter is not text");
            warn!("{}", warning);
            return (QuantTable::default(), Some(warning));
        };
        match Self::from_xml(xml) {
            Ok(table) => {
                debug!("Quantification table with {} entries", table.len());
                (table, None)
            }
            Err(e) => {
                let warning = MetadataWarning::new(BAND_QUANTIFICATION, e.to_string());
                warn!("{}, ignoring quantification", warning);
                (QuantTable::default(), Some(warning))
            }
        }
    }

    /// Parses the quantification XML document
    pub fn from_xml(xml: &str) -> HipsResult<Self> {
        let document: QuantificationDocument = from_str(xml)
            .map_err(|e| HipsError::GenericError(format!("Invalid quantification XML: {}", e)))?;
        let bands = document.entries.iter()
            .enumerate()
            .map(|(i, entry)| {
                let q = u8::try_from(entry.q).unwrap_or(0);
                QuantParams::new(q, entry.q_min, entry.q_max)
                    .map_err(|e| HipsError::GenericError(format!("Band {}: {}", i, e)))
            })
            .collect::<HipsResult<Vec<_>>>()?;
        Ok(QuantTable { bands })
    }

    /// Serializes the table to the XML stored in `BandQuantification`
    pub fn to_xml(&self) -> HipsResult<String> {
        let document = QuantificationDocument {
            entries: self.bands.iter()
                .map(|p| QuantificationEntry { q_min: p.q_min, q_max: p.q_max, q: p.q as i64 })
                .collect(),
        };
        to_string(&document).map_err(|e| HipsError::GenericError(format!("Failed to write quantification XML: {}", e)))
    }

    /// Table for the listed bands in the given order
    ///
    /// Selection stops at the first index without an entry so the result
    /// stays aligned with the selected bands.
    pub fn select(&self, indexes: &[usize]) -> QuantTable {
        QuantTable {
            bands: indexes.iter().map_while(|&i| self.bands.get(i).copied()).collect(),
        }
    }

    /// Derives per-band parameters spanning each band's finite value range
    ///
    /// Constant or empty bands get a unit range starting at their value.
    pub fn fit(buffer: &PixelBuffer, q: u8) -> HipsResult<Self> {
        let bands = buffer.planes().iter()
            .map(|plane| {
                let (lo, hi) = plane.min_max().unwrap_or((0.0, 1.0));
                let hi = if hi > lo { hi } else { lo + 1.0 };
                QuantParams::new(q, lo, hi)
            })
            .collect::<HipsResult<Vec<_>>>()?;
        Ok(QuantTable { bands })
    }

    /// Dequantizes a band plane to f32, or returns it unchanged when the band has no entry
    pub fn dequantize_plane(&self, band: usize, plane: BandPlane) -> BandPlane {
        match self.bands.get(band) {
            Some(params) => BandPlane::F32(plane.to_f64().mapv(|raw| params.dequantize(raw))),
            None => plane,
        }
    }

    /// Quantizes a band plane to the storage type of its entry
    ///
    /// Bands without an entry are returned unchanged.
    pub fn quantize_plane(&self, band: usize, plane: &BandPlane) -> BandPlane {
        let Some(params) = self.bands.get(band) else {
            return plane.clone();
        };
        let values = plane.to_f64();
        match params.storage_type() {
            SampleType::U8 => BandPlane::U8(values.mapv(|v| params.quantize(v) as u8)),
            SampleType::U16 => BandPlane::U16(values.mapv(|v| params.quantize(v) as u16)),
            _ => BandPlane::U32(values.mapv(|v| params.quantize(v))),
        }
    }
}
