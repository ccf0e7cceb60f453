//! Public entry points
//!
//! Stream level `decode`/`encode`, path based helpers, and the `HipsKit`
//! facade used by the command line tool.

use std::path::Path;
use log::info;
use ndarray::Array3;

use crate::compression::{CompressionMode, CompressionPreset};
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::header::HipsHeader;
use crate::hips::image::HipsImage;
use crate::hips::params::ExtendedParams;
use crate::hips::quantification::QuantTable;
use crate::hips::reader::HipsReader;
use crate::hips::types::PixelBuffer;
use crate::hips::writer::HipsWriter;
use crate::io::seekable::SeekableReader;
use crate::utils::export_utils::{self, ArrayFormat};
use crate::utils::progress::ProgressTracker;

/// File extension every HIPS path must carry
pub const HIPS_EXTENSION: &str = "hips";

/// Decodes a HIPS image from a stream positioned at its first byte
pub fn decode(reader: &mut dyn SeekableReader) -> HipsResult<HipsImage> {
    HipsReader::new().read(reader)
}

/// Encodes an image into the bytes of a HIPS file
pub fn encode(
    header: &HipsHeader,
    params: &ExtendedParams,
    quantification: &QuantTable,
    pixels: &PixelBuffer,
    mode: CompressionMode,
) -> HipsResult<Vec<u8>> {
    HipsWriter::encode(header, params, quantification, pixels, mode)
}

fn has_hips_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(HIPS_EXTENSION))
        .unwrap_or(false)
}

/// Reads a `.hips` file, optionally keeping only some bands
///
/// # Arguments
/// * `path` - Path of the file
/// * `band_indexes` - Bands to keep, in order; None keeps all
///
/// # Returns
/// The decoded image
pub fn read_file(path: &str, band_indexes: Option<&[usize]>) -> HipsResult<HipsImage> {
    let file_path = Path::new(path);
    if !has_hips_extension(file_path) {
        return Err(HipsError::GenericError(format!("{} is not a .hips file", path)));
    }
    if !file_path.is_file() {
        return Err(HipsError::GenericError(format!("File not found: {}", path)));
    }

    let image = HipsReader::new().load(path)?;
    match band_indexes {
        Some(indexes) => image.select_bands(indexes),
        None => Ok(image),
    }
}

/// Reads a `.hips` file and returns its pixels as f32
pub fn read_pixel_values(path: &str) -> HipsResult<Array3<f32>> {
    Ok(read_file(path, None)?.pixels.to_f32())
}

/// Writes an image to a `.hips` file
///
/// Raw output drops any quantification. Chunked output quantizes with
/// `bits` when given, fitting each band's value range, and otherwise reuses
/// the image's own quantification table.
///
/// # Arguments
/// * `path` - Output path; must end in `.hips` and its folder must exist
/// * `image` - Image to write
/// * `mode` - Payload compression
/// * `bits` - Quantification bit depth for chunked output
pub fn write_file(path: &str, image: &HipsImage, mode: CompressionMode, bits: Option<u8>) -> HipsResult<()> {
    check_output_path(path)?;
    let quantification = match (mode, bits) {
        (CompressionMode::Raw, _) => QuantTable::default(),
        (_, Some(q)) => QuantTable::fit(&image.pixels, q)?,
        (_, None) if !image.quantification.is_empty() => image.quantification.clone(),
        (_, None) => {
            return Err(HipsError::GenericError(format!(
                "{} output needs a quantification bit depth", mode
            )));
        }
    };

    let header = header_for(&image.header, &image.pixels);
    HipsWriter::write_to_file(path, &header, &image.params, &quantification, &image.pixels, mode)
}

/// Writes an image with a named preset
pub fn write_file_with_preset(path: &str, image: &HipsImage, preset: CompressionPreset) -> HipsResult<()> {
    let settings = preset.settings()?;
    info!("Preset {}: {} payload, {:?} bits", preset, settings.mode, settings.bits);
    write_file(path, image, settings.mode, settings.bits)
}

fn check_output_path(path: &str) -> HipsResult<()> {
    let file_path = Path::new(path);
    if !has_hips_extension(file_path) {
        return Err(HipsError::GenericError(format!("Output path {} must end in .{}", path, HIPS_EXTENSION)));
    }
    let parent = file_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    if !parent.is_dir() {
        return Err(HipsError::GenericError(format!("Folder {} does not exist", parent.display())));
    }
    Ok(())
}

/// Header whose format code matches the buffer's element type
///
/// A byte RGB header stays as it is while the buffer still holds bytes.
fn header_for(header: &HipsHeader, pixels: &PixelBuffer) -> HipsHeader {
    let mut header = header.clone();
    let keeps_format = header.pixel_format()
        .map(|f| f.sample_type() == pixels.sample_type())
        .unwrap_or(false);
    if !keeps_format {
        header.format_code = pixels.sample_type().pixel_format().code();
    }
    header
}

/// Main interface to the hipskit library
pub struct HipsKit;

impl HipsKit {
    pub fn new() -> Self {
        HipsKit
    }

    /// Analyze a HIPS file and return a description of its structure
    ///
    /// # Arguments
    /// * `input_path` - Path to the HIPS file to analyze
    ///
    /// # Returns
    /// String containing analysis information or an error
    pub fn analyze(&self, input_path: &str) -> HipsResult<String> {
        let image = read_file(input_path, None)?;
        let mut result = format!("HIPS Analysis Results for {}:\n", input_path);
        result.push_str(&image.to_string());
        for param in image.params.iter() {
            result.push_str(&format!("  {} ({}): {}\n", param.name, param.format.name(), param.value));
        }
        for (band, params) in image.quantification.iter().enumerate() {
            result.push_str(&format!("  Band {}: {}\n", band, params));
        }
        Ok(result)
    }

    /// Extract bands to CSV or PNG files
    ///
    /// With one band the output path is used as given. With several bands
    /// the band index is appended to the file stem.
    ///
    /// # Arguments
    /// * `input_path` - Path to the input HIPS file
    /// * `output_path` - Path of the output file
    /// * `band` - Single band to extract; None extracts every band
    /// * `format` - Output format
    /// * `band_indexes` - Optional band subset applied first
    /// * `progress` - Advanced once per written band
    ///
    /// # Returns
    /// Paths of the written files
    pub fn extract(
        &self,
        input_path: &str,
        output_path: &str,
        band: Option<usize>,
        format: ArrayFormat,
        band_indexes: Option<&[usize]>,
        progress: &ProgressTracker,
    ) -> HipsResult<Vec<String>> {
        let image = read_file(input_path, band_indexes)?;
        progress.set_length(if band.is_some() { 1 } else { image.band_count() as u64 });
        extract_bands(&image, output_path, band, format, progress)
    }

    /// Convert a HIPS file to another compression mode
    ///
    /// `progress` counts two stages, reading and writing.
    pub fn convert(
        &self,
        input_path: &str,
        output_path: &str,
        mode: CompressionMode,
        bits: Option<u8>,
        band_indexes: Option<&[usize]>,
        progress: &ProgressTracker,
    ) -> HipsResult<()> {
        progress.set_length(2);
        let image = read_file(input_path, band_indexes)?;
        progress.increment(1);
        progress.set_message(&format!("Writing {} bands", image.band_count()));
        write_file(output_path, &image, mode, bits)?;
        progress.increment(1);
        Ok(())
    }
}

impl Default for HipsKit {
    fn default() -> Self {
        Self::new()
    }
}

/// Output path of one band when several are extracted
pub fn band_output_path(output_path: &str, band: usize, format: ArrayFormat) -> String {
    let path = Path::new(output_path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("band");
    let name = format!("{}_band{}.{}", stem, band, format.extension());
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.join(name).to_string_lossy().into_owned(),
        None => name,
    }
}

/// Writes the selected band, or every band, of an image
fn extract_bands(
    image: &HipsImage,
    output_path: &str,
    band: Option<usize>,
    format: ArrayFormat,
    progress: &ProgressTracker,
) -> HipsResult<Vec<String>> {
    let bands: Vec<usize> = match band {
        Some(b) if b >= image.band_count() => {
            return Err(HipsError::GenericError(format!(
                "Band {} is out of range for an image with {} bands", b, image.band_count()
            )));
        }
        Some(b) => vec![b],
        None => (0..image.band_count()).collect(),
    };

    let mut written = Vec::with_capacity(bands.len());
    for &b in &bands {
        let plane = image.pixels.band(b)
            .ok_or_else(|| HipsError::GenericError(format!("Band {} is missing", b)))?;
        let path = if bands.len() == 1 {
            output_path.to_string()
        } else {
            band_output_path(output_path, b, format)
        };
        export_utils::save_band(&plane, &path, format)?;
        progress.increment(1);
        written.push(path);
    }
    info!("Extracted {} band(s) as {}", written.len(), format);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hips::pixel_format::PixelFormat;

    #[test]
    fn test_band_output_paths() {
        std::assert_eq!(band_output_path("out/cube.csv", 3, ArrayFormat::Csv), "out/cube_band3.csv");
        std::assert_eq!(band_output_path("cube.png", 0, ArrayFormat::Png), "cube_band0.png");
    }

    #[test]
    fn test_header_format_follows_buffer() {
        let header = HipsHeader::new(1, 1, 1, PixelFormat::UInt16);
        let pixels = PixelBuffer::F32(ndarray::array![[[1.0]]]);
        std::assert_eq!(header_for(&header, &pixels).format_code, 3);

        let rgb = HipsHeader::new(1, 1, 1, PixelFormat::ByteRgb);
        let bytes = PixelBuffer::U8(ndarray::array![[[1]]]);
        std::assert_eq!(header_for(&rgb, &bytes).format_code, 35);
    }

    #[test]
    fn test_paths_need_hips_extension() {
        std::assert!(read_file("cube.tif", None).is_err());
        std::assert!(check_output_path("cube.raw").is_err());
        std::assert!(check_output_path("/definitely/missing/folder/cube.hips").is_err());
        std::assert!(check_output_path("cube.HIPS").is_ok());
    }
}
