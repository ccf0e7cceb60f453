//! HIPS header structures and parsing
//!
//! The header is a fixed-order sequence of text lines followed by two
//! length-prefixed text blocks (history and description). Geometry and the
//! pixel format code are all the payload decoder needs from it.

use log::debug;
use std::fmt;
use std::io::Write;

use crate::hips::constants::{HIPS_MAGIC, NEWLINE};
use crate::hips::errors::{HipsError, HipsResult};
use crate::hips::pixel_format::PixelFormat;
use crate::io::line_reader;
use crate::io::seekable::SeekableReader;

/// Region of interest stored in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Roi {
    pub height: usize,
    pub width: usize,
    pub y: usize,
    pub x: usize,
}

/// Parsed HIPS header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HipsHeader {
    /// Origin name line (carried, not interpreted)
    pub origin_name: String,
    /// Sequence name line (carried, not interpreted)
    pub sequence_name: String,
    /// Number of frames
    pub frame_count: usize,
    /// Data type tag line (carried, not interpreted)
    pub data_type_tag: String,
    pub height: usize,
    pub width: usize,
    pub roi: Roi,
    /// Pixel format code, see `PixelFormat`
    pub format_code: u32,
    /// Number of bands as declared
    pub nominal_bands: usize,
    pub history: String,
    pub description: String,
}

impl HipsHeader {
    /// Creates a header for a `bands x height x width` image with a full-frame ROI
    pub fn new(height: usize, width: usize, bands: usize, format: PixelFormat) -> Self {
        HipsHeader {
            origin_name: String::new(),
            sequence_name: String::new(),
            frame_count: 1,
            data_type_tag: String::new(),
            height,
            width,
            roi: Roi { height, width, y: 0, x: 0 },
            format_code: format.code(),
            nominal_bands: bands,
            history: String::new(),
            description: String::new(),
        }
    }

    /// Number of bands actually stored: the larger of frames and bands
    pub fn effective_bands(&self) -> usize {
        self.frame_count.max(self.nominal_bands)
    }

    /// Pixel format for the format code, if it is in the table
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_code(self.format_code)
    }

    /// Reads the header from the start of a stream
    ///
    /// # Arguments
    /// * `reader` - Reader positioned at offset 0
    ///
    /// # Returns
    /// The parsed header, with the reader positioned at the parameter count line
    pub fn read(reader: &mut dyn SeekableReader) -> HipsResult<Self> {
        let (offset, magic) = line_reader::read_line(reader, "magic")?;
        if magic != HIPS_MAGIC {
            return Err(HipsError::format(offset, format!("expected magic '{}', found '{}'", HIPS_MAGIC, magic)));
        }

        let (_, origin_name) = line_reader::read_line(reader, "origin name")?;
        let (_, sequence_name) = line_reader::read_line(reader, "sequence name")?;
        let frame_count = read_usize(reader, "frame count")?;
        let (_, data_type_tag) = line_reader::read_line(reader, "data type tag")?;
        let height = read_usize(reader, "height")?;
        let width = read_usize(reader, "width")?;

        let roi = Roi {
            height: read_usize(reader, "roi height")?,
            width: read_usize(reader, "roi width")?,
            y: read_usize(reader, "roi y")?,
            x: read_usize(reader, "roi x")?,
        };

        let format_offset = line_reader::position(reader)?;
        let format_code = u32::try_from(line_reader::read_count_line(reader, "format code")?)
            .map_err(|_| HipsError::format(format_offset, "format code out of range"))?;
        let nominal_bands = read_usize(reader, "band count")?;

        let history = read_text_block(reader, "history")?;
        let description = read_text_block(reader, "description")?;

        let header = HipsHeader {
            origin_name,
            sequence_name,
            frame_count,
            data_type_tag,
            height,
            width,
            roi,
            format_code,
            nominal_bands,
            history,
            description,
        };

        if header.effective_bands() == 0 {
            return Err(HipsError::format(format_offset, "image declares neither frames nor bands"));
        }

        debug!("Header: {}x{} px, {} frames, {} bands, format {}",
               header.width, header.height, header.frame_count, header.nominal_bands, header.format_code);
        Ok(header)
    }

    /// Writes the header in the layout `read` expects
    pub fn write_to(&self, writer: &mut impl Write) -> HipsResult<()> {
        writeln!(writer, "{}", HIPS_MAGIC)?;
        for line in [&self.origin_name, &self.sequence_name] {
            write_single_line(writer, line)?;
        }
        writeln!(writer, "{}", self.frame_count)?;
        write_single_line(writer, &self.data_type_tag)?;
        writeln!(writer, "{}", self.height)?;
        writeln!(writer, "{}", self.width)?;
        writeln!(writer, "{}", self.roi.height)?;
        writeln!(writer, "{}", self.roi.width)?;
        writeln!(writer, "{}", self.roi.y)?;
        writeln!(writer, "{}", self.roi.x)?;
        writeln!(writer, "{}", self.format_code)?;
        writeln!(writer, "{}", self.nominal_bands)?;
        write_text_block(writer, &self.history)?;
        write_text_block(writer, &self.description)?;
        Ok(())
    }
}

impl fmt::Display for HipsHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HIPS Header:")?;
        writeln!(f, "  Dimensions: {}x{}", self.width, self.height)?;
        writeln!(f, "  Frames: {}, Bands: {} (effective {})",
                 self.frame_count, self.nominal_bands, self.effective_bands())?;
        writeln!(f, "  ROI: {}x{} at ({}, {})", self.roi.width, self.roi.height, self.roi.x, self.roi.y)?;
        let format_name = self.pixel_format()
            .map(|p| p.name())
            .unwrap_or_else(|| "unsupported".to_string());
        writeln!(f, "  Pixel format: {} ({})", self.format_code, format_name)?;
        if !self.history.is_empty() {
            writeln!(f, "  History: {}", self.history)?;
        }
        if !self.description.is_empty() {
            writeln!(f, "  Description: {}", self.description)?;
        }
        Ok(())
    }
}

fn read_usize(reader: &mut dyn SeekableReader, what: &str) -> HipsResult<usize> {
    let offset = line_reader::position(reader)?;
    let value = line_reader::read_count_line(reader, what)?;
    usize::try_from(value).map_err(|_| HipsError::format(offset, format!("{} out of range", what)))
}

/// Reads `<len>\n<len bytes>` and one optional trailing newline
fn read_text_block(reader: &mut dyn SeekableReader, what: &str) -> HipsResult<String> {
    let len = line_reader::read_count_line(reader, &format!("{} length", what))?;
    let bytes = line_reader::read_block(reader, len, what)?;
    line_reader::skip_byte_if(reader, NEWLINE)?;
    Ok(String::from_utf8_lossy(&bytes).trim().to_string())
}

fn write_text_block(writer: &mut impl Write, text: &str) -> HipsResult<()> {
    writeln!(writer, "{}", text.len())?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(&[NEWLINE])?;
    Ok(())
}

fn write_single_line(writer: &mut impl Write, text: &str) -> HipsResult<()> {
    if text.contains('\n') {
        return Err(HipsError::GenericError(format!("Header line must not contain a newline: {:?}", text)));
    }
    writeln!(writer, "{}", text)?;
    Ok(())
}
