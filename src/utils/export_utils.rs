//! Band export helpers
//!
//! Writes single bands as CSV tables or as normalized 8-bit grayscale
//! images for quick inspection.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::str::FromStr;

use image::GrayImage;
use log::debug;
use ndarray::Array2;

use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::types::BandPlane;

/// Output format of an extracted band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFormat {
    Csv,
    Png,
}

impl ArrayFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArrayFormat::Csv => "csv",
            ArrayFormat::Png => "png",
        }
    }
}

impl fmt::Display for ArrayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ArrayFormat {
    type Err = HipsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ArrayFormat::Csv),
            "png" => Ok(ArrayFormat::Png),
            _ => Err(HipsError::GenericError(format!("Unsupported array format: {}. Use csv or png", s))),
        }
    }
}

/// Writes a band in the requested format
pub fn save_band(plane: &BandPlane, path: &str, format: ArrayFormat) -> HipsResult<()> {
    debug!("Writing {}x{} band to {} as {}", plane.width(), plane.height(), path, format);
    match format {
        ArrayFormat::Csv => save_as_csv(plane, path),
        ArrayFormat::Png => save_as_png(plane, path),
    }
}

/// Writes a band as CSV, one line per row
fn save_as_csv(plane: &BandPlane, path: &str) -> HipsResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(plane, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// CSV rendition of a band
pub fn write_csv(plane: &BandPlane, writer: &mut impl Write) -> HipsResult<()> {
    let values = plane.to_f64();
    let integer = plane.sample_type().is_integer();
    for row in values.rows() {
        let line = row.iter()
            .map(|v| if integer { format!("{}", *v as u64) } else { format!("{}", v) })
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

/// Maps the band's finite range onto 0..=255
pub fn normalize_to_u8(plane: &BandPlane) -> Array2<u8> {
    let values = plane.to_f64();
    let (lo, hi) = plane.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    values.mapv(|v| {
        if !v.is_finite() || span <= 0.0 {
            0
        } else {
            (((v - lo) / span) * 255.0).round().clamp(0.0, 255.0) as u8
        }
    })
}

fn save_as_png(plane: &BandPlane, path: &str) -> HipsResult<()> {
    let normalized = normalize_to_u8(plane);
    let image = GrayImage::from_raw(plane.width() as u32, plane.height() as u32, normalized.iter().copied().collect())
        .ok_or_else(|| HipsError::GenericError("Band does not fit an image buffer".to_string()))?;
    image.save(path)
        .map_err(|e| HipsError::GenericError(format!("Failed to save {}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_csv(&BandPlane::U16(array![[1, 2], [3, 400]]), &mut out).unwrap();
        std::assert_eq!(String::from_utf8(out).unwrap(), "1,2\n3,400\n");

        let mut out = Vec::new();
        write_csv(&BandPlane::F32(array![[0.5, -1.0]]), &mut out).unwrap();
        std::assert_eq!(String::from_utf8(out).unwrap(), "0.5,-1\n");
    }

    #[test]
    fn test_normalization() {
        let normalized = normalize_to_u8(&BandPlane::F32(array![[10.0, 15.0, 20.0]]));
        std::assert_eq!(normalized, array![[0u8, 128, 255]]);
        std::assert_eq!(normalize_to_u8(&BandPlane::U8(array![[7, 7]])), array![[0u8, 0]]);
    }

    #[test]
    fn test_format_names() {
        std::assert_eq!("PNG".parse::<ArrayFormat>().unwrap(), ArrayFormat::Png);
        std::assert!("npy".parse::<ArrayFormat>().is_err());
    }
}
